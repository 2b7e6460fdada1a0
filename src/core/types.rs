use super::{FilmError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub type FilmId = u64;
pub type Position = i64;

/// The year of the oldest surviving motion picture.
pub const EARLIEST_FILM_YEAR: i64 = 1888;

/// One ranked record of the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub id: FilmId,
    pub position: Position,
    pub title: String,
    pub rating: f64,
    pub year: i64,
    pub budget: i64,
    pub gross: i64,
    pub poster: String,
}

/// Raw create request body.
///
/// Every field is optional so that a missing field can be reported as a
/// validation failure instead of a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilmDraft {
    pub title: Option<String>,
    pub rating: Option<f64>,
    pub year: Option<JsonValue>,
    pub budget: Option<i64>,
    pub gross: Option<i64>,
    pub poster: Option<String>,
    pub position: Option<Position>,
}

/// A validated candidate waiting for an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFilm {
    pub position: Option<Position>,
    pub title: String,
    pub rating: f64,
    pub year: i64,
    pub budget: i64,
    pub gross: i64,
    pub poster: String,
}

impl NewFilm {
    pub(crate) fn into_film(self, id: FilmId, position: Position) -> Film {
        Film {
            id,
            position,
            title: self.title,
            rating: self.rating,
            year: self.year,
            budget: self.budget,
            gross: self.gross,
            poster: self.poster,
        }
    }
}

impl FilmDraft {
    /// Checks the insert preconditions in order: required fields, year,
    /// budget/gross, position.
    pub fn validate(self) -> Result<NewFilm> {
        let (Some(title), Some(rating), Some(year), Some(budget), Some(gross), Some(poster)) = (
            non_blank(self.title),
            self.rating,
            self.year.filter(|year| !year.is_null()),
            self.budget,
            self.gross,
            non_blank(self.poster),
        ) else {
            return Err(FilmError::validation("Missing required fields"));
        };

        let year = parse_year(&year)
            .filter(|year| *year >= EARLIEST_FILM_YEAR)
            .ok_or_else(|| FilmError::validation("Invalid year"))?;

        if budget < 0 || gross < 0 {
            return Err(FilmError::validation(
                "Budget and gross cannot be negative",
            ));
        }

        if let Some(position) = self.position {
            validate_position(position)?;
        }

        Ok(NewFilm {
            position: self.position,
            title,
            rating,
            year,
            budget,
            gross,
            poster,
        })
    }
}

/// Partial update body. Only these keys are ever applied; anything else in
/// the request is dropped during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilmPatch {
    pub title: Option<String>,
    pub rating: Option<f64>,
    pub year: Option<i64>,
    pub budget: Option<i64>,
    pub gross: Option<i64>,
    pub poster: Option<String>,
    pub position: Option<Position>,
}

impl FilmPatch {
    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Writes every submitted payload field onto `film`. Position is left to
    /// the ranking logic.
    pub(crate) fn apply_payload(&self, film: &mut Film) {
        if let Some(title) = &self.title {
            film.title = title.clone();
        }
        if let Some(rating) = self.rating {
            film.rating = rating;
        }
        if let Some(year) = self.year {
            film.year = year;
        }
        if let Some(budget) = self.budget {
            film.budget = budget;
        }
        if let Some(gross) = self.gross {
            film.gross = gross;
        }
        if let Some(poster) = &self.poster {
            film.poster = poster.clone();
        }
    }
}

pub(crate) fn validate_position(position: Position) -> Result<()> {
    if position < 1 {
        return Err(FilmError::validation("Invalid position"));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn parse_year(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|year| year.fract() == 0.0)
                .map(|year| year as i64)
        }),
        JsonValue::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(body: JsonValue) -> FilmDraft {
        serde_json::from_value(body).unwrap()
    }

    fn complete() -> JsonValue {
        json!({
            "title": "The Godfather",
            "rating": 9.2,
            "year": 1972,
            "budget": 6000000,
            "gross": 250000000,
            "poster": "godfather.jpg",
            "position": 2
        })
    }

    fn message(err: FilmError) -> String {
        match err {
            FilmError::Validation(message) => message,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_complete_draft_validates() {
        let film = draft(complete()).validate().unwrap();
        assert_eq!(film.title, "The Godfather");
        assert_eq!(film.year, 1972);
        assert_eq!(film.position, Some(2));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let err = draft(json!({})).validate().unwrap_err();
        assert_eq!(message(err), "Missing required fields");

        let mut body = complete();
        body["poster"] = json!("   ");
        let err = draft(body).validate().unwrap_err();
        assert_eq!(message(err), "Missing required fields");
    }

    #[test]
    fn test_year_floor() {
        let mut body = complete();
        body["year"] = json!(1887);
        assert_eq!(message(draft(body).validate().unwrap_err()), "Invalid year");

        let mut body = complete();
        body["year"] = json!(1888);
        assert_eq!(draft(body).validate().unwrap().year, 1888);
    }

    #[test]
    fn test_year_accepts_numeric_text() {
        let mut body = complete();
        body["year"] = json!("1994");
        assert_eq!(draft(body).validate().unwrap().year, 1994);

        let mut body = complete();
        body["year"] = json!("nineteen");
        assert_eq!(message(draft(body).validate().unwrap_err()), "Invalid year");
    }

    #[test]
    fn test_negative_money_rejected() {
        let mut body = complete();
        body["budget"] = json!(-1);
        assert_eq!(
            message(draft(body).validate().unwrap_err()),
            "Budget and gross cannot be negative"
        );

        let mut body = complete();
        body["gross"] = json!(-5);
        assert!(draft(body).validate().is_err());

        let mut body = complete();
        body["budget"] = json!(0);
        assert!(draft(body).validate().is_ok());
    }

    #[test]
    fn test_position_must_be_positive() {
        let mut body = complete();
        body["position"] = json!(0);
        assert_eq!(message(draft(body).validate().unwrap_err()), "Invalid position");
    }

    #[test]
    fn test_patch_ignores_unknown_fields() {
        let patch: FilmPatch =
            serde_json::from_value(json!({ "title": "Heat", "id": 99, "color": "red" })).unwrap();
        let mut film = draft(complete()).validate().unwrap().into_film(1, 1);
        patch.apply_payload(&mut film);
        assert_eq!(film.title, "Heat");
        assert_eq!(film.id, 1);
    }
}
