//! Fixture dataset creation
//!
//! The dataset is written in the same JSON shape the importer reads in
//! production, so every test server goes through the real import path.

use super::constants::*;
use anyhow::Result;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

/// Builds one dataset entry with the given reviews and typical metadata.
pub fn movie_entry(title: &str, poster: &str, reviews: Value) -> Value {
    json!({
        "영화명": title,
        "포스터": poster,
        "상영시간": "132분",
        "개봉년도": "2019",
        "줄거리": "반지하 가족의 이야기",
        "장르": "드라마",
        "평점": "8.9",
        "관객수": "10,313,735명",
        "리뷰": reviews
    })
}

/// The dataset every `TestServer::spawn` imports.
pub fn fixture_dataset() -> Value {
    json!([
        movie_entry(
            MOVIE_1_TITLE,
            MOVIE_1_POSTER,
            json!([
                {"리뷰내용": MOVIE_1_POSITIVE_REVIEW, "감정": "긍정"},
                {"리뷰내용": MOVIE_1_NEGATIVE_REVIEW, "감정": "부정"}
            ])
        ),
        {
            "영화명": MOVIE_2_TITLE,
            "포스터": MOVIE_2_POSTER,
            "리뷰": []
        },
        movie_entry(
            MOVIE_3_TITLE,
            MOVIE_3_POSTER,
            json!([
                {"리뷰내용": "복수극의 연출이 훌륭하다!", "감정": "긍정"},
                {"리뷰내용": "배우들의 연기가 훌륭하다", "감정": "긍정"},
                {"리뷰내용": "음악도 좋았다", "감정": "긍정"}
            ])
        )
    ])
}

/// Writes `dataset` as `data.json` inside `dir`.
fn write_dataset(dir: &TempDir, dataset: &Value) -> Result<PathBuf> {
    let path = dir.path().join("data.json");
    std::fs::write(&path, serde_json::to_string_pretty(dataset)?)?;
    Ok(path)
}

/// Creates a temporary directory holding `dataset`.
/// Returns (temp_dir, dataset_path, db_path)
pub fn create_test_dataset(dataset: &Value) -> Result<(TempDir, PathBuf, PathBuf)> {
    let dir = TempDir::new()?;
    let data_path = write_dataset(&dir, dataset)?;
    let db_path = dir.path().join("movie_database.db");
    Ok((dir, data_path, db_path))
}
