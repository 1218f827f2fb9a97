use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::impl_record;
use crate::util::split_featured_artists;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub another_title: String,
    pub thumbnail: String,
    pub cover: String,
    pub directors: Vec<String>,
    pub actors: Vec<String>,
    pub countries: Vec<String>,
    pub genres: Vec<String>,
    pub description: String,
    pub year: i64,
    pub imdb_rating: f64,
    pub is_series: bool,
    pub max_ep: i64,
    pub current_eps: i64,
    pub episode_ids: Vec<i64>,
    #[serde(default)]
    pub released: Option<NaiveDateTime>,
    #[serde(default)]
    pub checktime: Option<NaiveDateTime>,
}

impl_record!(Movie as "hdvmovies" {
    id,
    title,
    another_title,
    thumbnail,
    cover,
    directors,
    actors,
    countries,
    genres,
    description,
    year,
    imdb_rating,
    is_series,
    max_ep,
    current_eps,
    episode_ids,
    released,
    checktime,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub artists: Vec<String>,
    pub authors: Vec<String>,
    pub topics: Vec<String>,
    pub thumbnail: String,
    pub producer: String,
    pub downloads: i64,
    pub plays: i64,
    pub formats: String,
    pub href: String,
    pub is_lyric: i64,
    pub lyric: String,
    pub date_released: String,
    pub date_created: String,
    #[serde(rename = "type")]
    pub kind: bool,
    #[serde(default)]
    pub checktime: Option<NaiveDateTime>,
}

impl_record!(Video as "csnvideos" {
    id,
    title,
    artists,
    authors,
    topics,
    thumbnail,
    producer,
    downloads,
    plays,
    formats,
    href,
    is_lyric,
    lyric,
    date_released,
    date_created,
    kind = "type",
    checktime,
});

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogRecord {
    Movie(Movie),
    Video(Video),
}

impl Video {
    /// Splits `"A feat: B"` artist entries into separate names.
    pub fn normalize(&mut self) {
        self.artists = split_featured_artists(&self.artists);
    }
}

impl CatalogRecord {
    pub fn normalize(&mut self) {
        if let Self::Video(video) = self {
            video.normalize();
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Movie(movie) => movie.id,
            Self::Video(video) => video.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{EncoderConfig, Record, introspect};

    #[test]
    fn catalog_records_declare_their_tables() {
        assert_eq!(Movie::table_name(), "hdvmovies");
        assert_eq!(Video::table_name(), "csnvideos");
    }

    #[test]
    fn video_kind_maps_to_type_column() {
        let columns =
            introspect(&Video::default(), &EncoderConfig::default()).expect("introspection");

        assert_eq!(columns.len(), 17);
        assert_eq!(columns.names[15], "type");
        assert_eq!(columns.values[15], "false");
        assert_eq!(columns.values[16], "NULL");
    }

    #[test]
    fn catalog_record_parses_tagged_json() {
        let raw = r#"[
            {"kind": "video", "id": 1213739, "title": "Thương Vợ", "artists": ["Lý Hải"],
             "authors": [], "topics": [], "thumbnail": "", "producer": "", "downloads": 5541,
             "plays": 168297, "formats": "[]", "href": "", "is_lyric": 1, "lyric": "",
             "date_released": "2014", "date_created": "2014-02-06 10:47:00", "type": false,
             "checktime": "2013-11-21T00:00:00"},
            {"kind": "movie", "id": 7, "title": "Say It Ain't So", "another_title": "",
             "thumbnail": "", "cover": "", "directors": [], "actors": [], "countries": [],
             "genres": ["a", "b"], "description": "", "year": 2014, "imdb_rating": 7.5,
             "is_series": true, "max_ep": 24, "current_eps": 3, "episode_ids": [1, 2, 3]}
        ]"#;

        let records: Vec<CatalogRecord> = serde_json::from_str(raw).expect("records parse");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id(), 1213739);
        match &records[1] {
            CatalogRecord::Movie(movie) => {
                assert_eq!(movie.current_eps, 3);
                assert_eq!(movie.released, None);
            }
            other => panic!("expected movie, got {other:?}"),
        }
    }

    #[test]
    fn normalize_splits_featured_video_artists() {
        let mut record = CatalogRecord::Video(Video {
            id: 1,
            artists: vec![
                "Lý Hải feat: Phi Nhung".to_string(),
                "Mr. Siro FEAT: Vương Anh Tú".to_string(),
            ],
            ..Video::default()
        });

        record.normalize();

        let CatalogRecord::Video(video) = &record else {
            panic!("expected video, got {record:?}");
        };
        assert_eq!(
            video.artists,
            vec!["Lý Hải", "Phi Nhung", "Mr. Siro FEAT: Vương Anh Tú"]
        );

        let columns = introspect(video, &EncoderConfig::default()).expect("introspection");
        assert_eq!(
            columns.values[2],
            r#"$delim${"Lý Hải","Phi Nhung","Mr. Siro FEAT: Vương Anh Tú"}$delim$"#
        );
    }

    #[test]
    fn normalize_leaves_movies_untouched() {
        let movie = Movie {
            id: 7,
            actors: vec!["A feat: B".to_string()],
            ..Movie::default()
        };
        let mut record = CatalogRecord::Movie(movie.clone());

        record.normalize();

        match record {
            CatalogRecord::Movie(normalized) => assert_eq!(normalized, movie),
            other => panic!("expected movie, got {other:?}"),
        }
    }
}
