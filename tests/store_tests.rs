//! Store-level behaviour: schema, atomic refresh, analytical queries.

use movie_etl::db::{Store, schema};
use movie_etl::entities::{genres, movie_genres, movies, omdb_details, ratings, users};
use movie_etl::models::EntitySet;
use movie_etl::services::load;
use sea_orm::{ConnectionTrait, Statement};

async fn temp_store() -> (Store, String) {
    let db_path =
        std::env::temp_dir().join(format!("movie-etl-store-test-{}.db", uuid::Uuid::new_v4()));
    let db_url = format!("sqlite:{}", db_path.display());
    let store = Store::new(&db_url).await.expect("failed to open store");
    (store, db_url)
}

fn movie(movie_id: i32, title: &str, year: Option<i32>) -> movies::Model {
    movies::Model {
        movie_id,
        title: title.to_string(),
        year,
    }
}

fn rating(user_id: i32, movie_id: i32, rating: f64, ts: i64) -> ratings::Model {
    ratings::Model {
        user_id,
        movie_id,
        rating,
        rating_timestamp: ts,
    }
}

fn detail(movie_id: i32, imdb_id: &str, director: Option<&str>) -> omdb_details::Model {
    omdb_details::Model {
        movie_id,
        imdb_id: Some(imdb_id.to_string()),
        director: director.map(str::to_string),
        plot: None,
        box_office: None,
        released_date: None,
        runtime_minutes: None,
        language: None,
        country: None,
    }
}

fn genre_links(pairs: &[(i32, &str)]) -> Vec<movie_genres::Model> {
    pairs
        .iter()
        .map(|(movie_id, genre)| movie_genres::Model {
            movie_id: *movie_id,
            genre: (*genre).to_string(),
        })
        .collect()
}

/// Movies 1 and 2 tie on a 4.5 average; movie 3 has a single 5.0.
fn analytics_set() -> EntitySet {
    EntitySet {
        movies: vec![
            movie(1, "Heat (1995)", Some(1995)),
            movie(2, "Casino (1995)", Some(1995)),
            movie(3, "Fargo (1996)", Some(1996)),
            movie(4, "Untitled", None),
        ],
        genres: ["Comedy", "Crime", "Drama"]
            .into_iter()
            .map(|g| genres::Model {
                genre: g.to_string(),
            })
            .collect(),
        movie_genres: genre_links(&[
            (1, "Crime"),
            (1, "Drama"),
            (2, "Crime"),
            (3, "Comedy"),
            (4, "Drama"),
        ]),
        users: (1..=3).map(|user_id| users::Model { user_id }).collect(),
        ratings: vec![
            rating(1, 1, 4.0, 10),
            rating(2, 1, 5.0, 11),
            rating(1, 2, 4.5, 12),
            rating(2, 2, 4.5, 13),
            rating(3, 3, 5.0, 14),
            rating(3, 4, 1.0, 15),
        ],
        omdb_details: vec![
            detail(1, "tt0113277", Some("Michael Mann")),
            detail(2, "tt0112641", Some("Martin Scorsese")),
            detail(3, "tt0116282", None),
        ],
    }
}

#[tokio::test]
async fn schema_can_be_applied_repeatedly() {
    let (store, db_url) = temp_store().await;
    load::load_set(&store, &analytics_set(), 100).await.unwrap();

    schema::apply(&store.conn).await.unwrap();
    schema::apply(&store.conn).await.unwrap();
    drop(store);

    let reopened = Store::new(&db_url).await.unwrap();
    assert_eq!(reopened.table_counts().await.unwrap().ratings, 6);

    let backend = reopened.conn.get_database_backend();
    let indexes = reopened
        .conn
        .query_all(Statement::from_string(
            backend,
            "SELECT name FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%' ORDER BY name"
                .to_string(),
        ))
        .await
        .unwrap();
    let names: Vec<String> = indexes
        .iter()
        .map(|row| row.try_get_by_index::<String>(0).unwrap())
        .collect();
    let mut expected: Vec<String> = schema::INDEXES.iter().map(|s| s.to_string()).collect();
    expected.sort();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn failed_refresh_leaves_previous_contents() {
    let (store, _) = temp_store().await;
    let original = analytics_set();
    let before = load::load_set(&store, &original, 100).await.unwrap();

    // Bypasses validation so the store itself has to reject the rows.
    let mut broken = analytics_set();
    broken.movies.push(movie(5, "Ronin (1998)", Some(1998)));
    broken.ratings.push(rating(1, 999, 3.0, 99));

    let err = store.replace_all(&broken, 2).await.unwrap_err();
    assert!(format!("{err:#}").contains("ratings"));
    assert_eq!(store.table_counts().await.unwrap(), before);

    let mut out_of_range = analytics_set();
    out_of_range.ratings[0].rating = 7.5;
    assert!(store.replace_all(&out_of_range, 100).await.is_err());
    assert_eq!(store.table_counts().await.unwrap(), before);
}

#[tokio::test]
async fn duplicate_external_id_is_rejected_by_store() {
    let (store, _) = temp_store().await;
    let mut set = analytics_set();
    set.omdb_details[1].imdb_id = Some("tt0113277".to_string());

    assert!(store.replace_all(&set, 100).await.is_err());
    assert_eq!(store.table_counts().await.unwrap().movies, 0);
}

#[tokio::test]
async fn top_rated_movies_includes_ties() {
    let (store, _) = temp_store().await;
    load::load_set(&store, &analytics_set(), 100).await.unwrap();

    // Movie 3 has a perfect average from a single rating.
    let top = store.top_rated_movies(1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].movie_id, 3);

    let top = store.top_rated_movies(2).await.unwrap();
    let ids: Vec<i32> = top.iter().map(|m| m.movie_id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(top.iter().all(|m| (m.average_rating - 4.5).abs() < f64::EPSILON));
    assert!(top.iter().all(|m| m.rating_count == 2));

    assert!(store.top_rated_movies(3).await.unwrap().is_empty());
}

#[tokio::test]
async fn most_prolific_directors_includes_ties() {
    let (store, _) = temp_store().await;
    load::load_set(&store, &analytics_set(), 100).await.unwrap();

    let directors = store.most_prolific_directors().await.unwrap();
    let names: Vec<&str> = directors.iter().map(|d| d.director.as_str()).collect();
    assert_eq!(names, vec!["Martin Scorsese", "Michael Mann"]);
    assert!(directors.iter().all(|d| d.movie_count == 1));
}

#[tokio::test]
async fn genres_and_years() {
    let (store, _) = temp_store().await;
    load::load_set(&store, &analytics_set(), 100).await.unwrap();

    // Comedy 5.0; Crime (4.0 + 5.0 + 4.5 + 4.5) / 4 = 4.5; Drama (4.0 + 5.0 + 1.0) / 3.
    let genres = store.top_genres_by_average(10).await.unwrap();
    let names: Vec<&str> = genres.iter().map(|g| g.genre.as_str()).collect();
    assert_eq!(names, vec!["Comedy", "Crime", "Drama"]);
    assert_eq!(genres[1].rating_count, 4);

    assert_eq!(store.top_genres_by_average(1).await.unwrap().len(), 1);

    let years = store.average_rating_by_year().await.unwrap();
    let by_year: Vec<(i32, i64)> = years.iter().map(|y| (y.year, y.rating_count)).collect();
    assert_eq!(by_year, vec![(1995, 4), (1996, 1)]);
    assert!((years[0].average_rating - 4.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn empty_store_queries_return_nothing() {
    let (store, _) = temp_store().await;

    assert!(store.top_rated_movies(1).await.unwrap().is_empty());
    assert!(store.most_prolific_directors().await.unwrap().is_empty());
    assert!(store.top_genres_by_average(5).await.unwrap().is_empty());
    assert!(store.average_rating_by_year().await.unwrap().is_empty());
    assert_eq!(store.table_counts().await.unwrap().movies, 0);
}
