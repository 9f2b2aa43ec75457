use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parser::flexible::{FlexibleDate, FlexibleFloat};

/// A film, series or other catalogued production.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Work {
    pub id: String,
    pub identifier: String,
    pub work_type: String,
    pub slug: String,
    pub title: String,
    pub original_title: String,
    pub plot: Option<String>,
    pub user_rating: Option<FlexibleFloat>,
    pub runtime: Option<FlexibleFloat>,
    pub release_date: Option<FlexibleDate>,
    pub spoken_languages: Vec<String>,
    pub languages: Vec<String>,
    pub is_streamable: bool,
    pub is_in_theatre: bool,
    pub featured: bool,
    pub genres: Vec<String>,
    pub created_at: FlexibleDate,
    pub updated_at: FlexibleDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Person {
    pub id: String,
    pub identifier: String,
    pub name: String,
    pub slug: String,
    pub biography: Option<String>,
    pub birth_date: Option<FlexibleDate>,
    pub death_date: Option<FlexibleDate>,
    pub deceased: bool,
    pub aliases: Vec<String>,
    pub nationality: Vec<String>,
    pub external_links: Vec<Value>,
    pub featured: bool,
    pub created_at: FlexibleDate,
    pub updated_at: FlexibleDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Article {
    pub id: String,
    pub identifier: String,
    pub slug: String,
    pub title: String,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub tags: Vec<String>,
    pub published_at: Option<FlexibleDate>,
    pub created_at: FlexibleDate,
    pub updated_at: FlexibleDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn work_accepts_string_and_numeric_rating() {
        let with_string: Work = serde_json::from_str(
            r#"{
                "id": "work123",
                "workType": "movie",
                "slug": "test-movie",
                "title": "Test Movie",
                "originalTitle": "Test Movie",
                "userRating": "7.5",
                "spokenLanguages": [],
                "languages": [],
                "isStreamable": false,
                "isInTheatre": false,
                "featured": false,
                "genres": [],
                "createdAt": "2023-01-01T00:00:00Z",
                "updatedAt": "2023-01-01T00:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(with_string.user_rating.map(|r| r.as_f64()), Some(7.5));
        assert_eq!(with_string.work_type, "movie");

        let with_number: Work =
            serde_json::from_str(r#"{"id": "work123", "userRating": 8.2}"#).unwrap();
        assert_eq!(with_number.user_rating.map(|r| r.as_f64()), Some(8.2));
        assert!(with_number.created_at.is_unset());
    }

    #[test]
    fn person_birth_date_in_either_layout() {
        let expected = Utc.with_ymd_and_hms(1983, 8, 6, 0, 0, 0).unwrap();
        for birth in ["1983-08-06", "1983-08-06T00:00:00Z"] {
            let json = format!(
                r#"{{"id": "person123", "name": "Test Person", "birthDate": "{birth}", "deceased": false}}"#
            );
            let person: Person = serde_json::from_str(&json).unwrap();
            assert_eq!(person.birth_date.and_then(|d| d.instant()), Some(expected));
        }
    }

    #[test]
    fn article_with_null_dates() {
        let article: Article = serde_json::from_str(
            r#"{"id": "a1", "title": "News", "publishedAt": null, "createdAt": ""}"#,
        )
        .unwrap();
        assert!(article.published_at.is_none());
        assert!(article.created_at.is_unset());

        let encoded = serde_json::to_value(&article).unwrap();
        assert_eq!(encoded["createdAt"], Value::Null);
    }
}
