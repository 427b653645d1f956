//! Dataset records as they appear in the JSON input.

use crate::catalog_store::NewMovie;
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

/// Review fields stay untyped here so that a wrong type is reported against
/// the review, not the whole movie.
#[derive(Clone, Debug, Deserialize)]
pub struct RawReview {
    #[serde(rename = "리뷰내용", default)]
    pub text: Option<Value>,
    #[serde(rename = "감정", default)]
    pub sentiment: Option<Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawMovie {
    #[serde(rename = "영화명")]
    pub title: String,
    #[serde(rename = "포스터")]
    pub poster_url: String,
    #[serde(rename = "상영시간", default, deserialize_with = "lenient_string")]
    pub running_time: Option<String>,
    #[serde(rename = "개봉년도", default, deserialize_with = "lenient_string")]
    pub release_date: Option<String>,
    #[serde(rename = "줄거리", default, deserialize_with = "lenient_string")]
    pub synopsis: Option<String>,
    #[serde(rename = "장르", default, deserialize_with = "lenient_string")]
    pub genre: Option<String>,
    #[serde(rename = "평점", default, deserialize_with = "lenient_string")]
    pub rating: Option<String>,
    #[serde(rename = "관객수", default, deserialize_with = "lenient_count")]
    pub audience: Option<i64>,
    #[serde(rename = "리뷰", default)]
    pub reviews: Vec<RawReview>,
}

impl RawMovie {
    pub fn to_new_movie(&self) -> NewMovie {
        NewMovie {
            title: self.title.clone(),
            poster_url: self.poster_url.clone(),
            running_time: self.running_time.clone(),
            release_date: self.release_date.clone(),
            synopsis: self.synopsis.clone(),
            genre: self.genre.clone(),
            rating: self.rating.clone(),
            audience: self.audience,
        }
    }
}

/// Accepts a string or a number (stored in its textual form).
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected a string or a number, got {}",
            other
        ))),
    }
}

/// Accepts an integer or a digit string such as "1,234,567" or "1,234,567명".
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid count {}", n))),
        Some(Value::String(s)) => {
            let digits: String = s
                .trim()
                .trim_end_matches('명')
                .chars()
                .filter(|c| *c != ',')
                .collect();
            if digits.is_empty() {
                return Ok(None);
            }
            digits
                .parse::<i64>()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("invalid count '{}'", s)))
        }
        Some(other) => Err(de::Error::custom(format!(
            "expected a count, got {}",
            other
        ))),
    }
}
