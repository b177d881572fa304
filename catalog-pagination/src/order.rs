//! Ordering specs and the comparator built from them.

use std::cmp::Ordering;

use crate::cursor::{Cursor, KeyKind, KeyValue};
use crate::error::{PaginationError, PaginationResult};

/// A record that can be ordered and paginated.
pub trait Sortable {
    /// Fields that may appear in an [`OrderSpec`], with the kind of their
    /// values.
    const SORT_FIELDS: &'static [(&'static str, KeyKind)];

    /// Fields holding a value that is unique per record.
    const UNIQUE_FIELDS: &'static [&'static str];

    /// Sort fields that may hold [`KeyValue::Null`].
    const NULLABLE_FIELDS: &'static [&'static str] = &[];

    /// Value of one of [`Sortable::SORT_FIELDS`] for this record.
    fn sort_value(&self, field: &str) -> KeyValue;
}

/// Ordering direction of one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl Direction {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

/// One `(field, direction)` pair of an [`OrderSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderField {
    pub name: &'static str,
    pub direction: Direction,
    pub kind: KeyKind,
    pub nullable: bool,
}

impl OrderField {
    /// Whether `value` can be this field's value.
    fn accepts(&self, value: &KeyValue) -> bool {
        match value.kind() {
            Some(kind) => kind == self.kind,
            None => self.nullable,
        }
    }
}

/// A total order over the records of one type.
///
/// Written as a list of field names, each optionally prefixed with `-` for
/// descending order, e.g. `["title", "-id"]`. The list must include one of
/// the record's unique fields so that no two records compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    fields: Vec<OrderField>,
}

impl OrderSpec {
    /// Parse and validate an ordering for records of type `T`.
    pub fn parse<T: Sortable>(fields: &[&str]) -> PaginationResult<Self> {
        if fields.is_empty() {
            return Err(PaginationError::InvalidOrderSpec(
                "ordering must name at least one field".into(),
            ));
        }

        let mut parsed: Vec<OrderField> = Vec::with_capacity(fields.len());

        for raw in fields {
            let (name, direction) = match raw.strip_prefix('-') {
                Some(name) => (name, Direction::Desc),
                None => (*raw, Direction::Asc),
            };

            // Keep the 'static name from the record's field table.
            let Some(&(name, kind)) = T::SORT_FIELDS.iter().find(|(field, _)| *field == name)
            else {
                return Err(PaginationError::InvalidOrderSpec(format!(
                    "unknown field `{name}`"
                )));
            };

            if parsed.iter().any(|field| field.name == name) {
                return Err(PaginationError::InvalidOrderSpec(format!(
                    "field `{name}` appears more than once"
                )));
            }

            parsed.push(OrderField {
                name,
                direction,
                kind,
                nullable: T::NULLABLE_FIELDS.contains(&name),
            });
        }

        if !parsed
            .iter()
            .any(|field| T::UNIQUE_FIELDS.contains(&field.name))
        {
            return Err(PaginationError::InvalidOrderSpec(format!(
                "ordering must include a unique field (one of {:?})",
                T::UNIQUE_FIELDS
            )));
        }

        Ok(Self { fields: parsed })
    }

    pub fn fields(&self) -> &[OrderField] {
        &self.fields
    }

    /// The ordering-key tuple of a record.
    pub fn key_of<T: Sortable>(&self, record: &T) -> Vec<KeyValue> {
        self.fields
            .iter()
            .map(|field| record.sort_value(field.name))
            .collect()
    }

    /// The cursor pointing at a record.
    pub fn cursor_for<T: Sortable>(&self, record: &T) -> Cursor {
        Cursor::encode(&self.key_of(record))
    }

    /// Decode a cursor and check that it carries one value of the right
    /// kind per field.
    pub fn decode_cursor(&self, cursor: &Cursor) -> PaginationResult<Vec<KeyValue>> {
        let key = cursor.decode()?;

        if key.len() != self.fields.len() {
            return Err(PaginationError::MalformedCursor(format!(
                "{cursor} (expected {} values, found {})",
                self.fields.len(),
                key.len()
            )));
        }

        if let Some((field, value)) = self
            .fields
            .iter()
            .zip(&key)
            .find(|(field, value)| !field.accepts(value))
        {
            return Err(PaginationError::MalformedCursor(format!(
                "{cursor} (unexpected value {value:?} for `{}`)",
                field.name
            )));
        }

        Ok(key)
    }

    /// Compare two ordering-key tuples field by field.
    pub fn compare_keys(&self, a: &[KeyValue], b: &[KeyValue]) -> Ordering {
        self.fields
            .iter()
            .zip(a.iter().zip(b))
            .map(|(field, (a, b))| field.direction.apply(a.cmp(b)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Compare two records.
    pub fn compare<T: Sortable>(&self, a: &T, b: &T) -> Ordering {
        self.fields
            .iter()
            .map(|field| {
                field
                    .direction
                    .apply(a.sort_value(field.name).cmp(&b.sort_value(field.name)))
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Whether `record` sorts strictly after the position `key`.
    pub fn is_after<T: Sortable>(&self, record: &T, key: &[KeyValue]) -> bool {
        self.compare_keys(&self.key_of(record), key).is_gt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    #[derive(Debug, Clone)]
    struct Track {
        id: i64,
        album: &'static str,
        position: i64,
        released: Option<DateTime<Utc>>,
    }

    impl Sortable for Track {
        const SORT_FIELDS: &'static [(&'static str, KeyKind)] = &[
            ("id", KeyKind::Int),
            ("album", KeyKind::Text),
            ("position", KeyKind::Int),
            ("released", KeyKind::Timestamp),
        ];
        const UNIQUE_FIELDS: &'static [&'static str] = &["id"];
        const NULLABLE_FIELDS: &'static [&'static str] = &["released"];

        fn sort_value(&self, field: &str) -> KeyValue {
            match field {
                "id" => self.id.into(),
                "album" => self.album.into(),
                "position" => self.position.into(),
                "released" => self.released.into(),
                _ => KeyValue::Null,
            }
        }
    }

    fn track(id: i64, album: &'static str, position: i64) -> Track {
        Track {
            id,
            album,
            position,
            released: None,
        }
    }

    fn field(name: &'static str, direction: Direction, kind: KeyKind) -> OrderField {
        OrderField {
            name,
            direction,
            kind,
            nullable: false,
        }
    }

    #[test]
    fn test_parse_directions() {
        let spec = OrderSpec::parse::<Track>(&["album", "-position", "id"]).unwrap();

        assert_eq!(
            spec.fields(),
            &[
                field("album", Direction::Asc, KeyKind::Text),
                field("position", Direction::Desc, KeyKind::Int),
                field("id", Direction::Asc, KeyKind::Int),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_invalid_specs() {
        let cases: &[&[&str]] = &[
            &[],
            &["album"],
            &["album", "position"],
            &["genre", "id"],
            &["id", "-id"],
        ];

        for fields in cases {
            assert!(
                matches!(
                    OrderSpec::parse::<Track>(fields),
                    Err(PaginationError::InvalidOrderSpec(_))
                ),
                "{fields:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_first_differing_field_decides() {
        let spec = OrderSpec::parse::<Track>(&["album", "-position", "id"]).unwrap();

        let a = track(1, "Blue", 1);
        let b = track(2, "Blue", 2);
        let c = track(3, "Abbey Road", 9);

        assert_eq!(spec.compare(&b, &a), Ordering::Less);
        assert_eq!(spec.compare(&c, &a), Ordering::Less);
        assert_eq!(spec.compare(&a, &a), Ordering::Equal);
    }

    #[test]
    fn test_unique_field_breaks_ties() {
        let spec = OrderSpec::parse::<Track>(&["album", "-id"]).unwrap();
        let tracks: Vec<Track> = (1..=5).map(|id| track(id, "Same", 1)).collect();

        for a in &tracks {
            for b in &tracks {
                let ordering = spec.compare(a, b);
                if a.id == b.id {
                    assert_eq!(ordering, Ordering::Equal);
                } else {
                    assert_ne!(ordering, Ordering::Equal);
                    assert_eq!(ordering, b.id.cmp(&a.id));
                }
            }
        }
    }

    #[test]
    fn test_compare_keys_matches_compare() {
        let spec = OrderSpec::parse::<Track>(&["-album", "position", "id"]).unwrap();
        let a = track(1, "Kid A", 3);
        let b = track(2, "Kid A", 4);

        assert_eq!(
            spec.compare_keys(&spec.key_of(&a), &spec.key_of(&b)),
            spec.compare(&a, &b)
        );
        assert!(spec.is_after(&b, &spec.key_of(&a)));
        assert!(!spec.is_after(&a, &spec.key_of(&a)));
    }

    #[test]
    fn test_decode_cursor_checks_arity() {
        let spec = OrderSpec::parse::<Track>(&["album", "id"]).unwrap();
        let cursor = Cursor::encode(&[KeyValue::Int(1)]);

        assert!(matches!(
            spec.decode_cursor(&cursor),
            Err(PaginationError::MalformedCursor(_))
        ));

        let cursor = spec.cursor_for(&track(4, "Ok Computer", 2));
        assert_eq!(
            spec.decode_cursor(&cursor).unwrap(),
            vec![KeyValue::Text("Ok Computer".into()), KeyValue::Int(4)]
        );
    }

    #[test]
    fn test_decode_cursor_rejects_wrong_kinds() {
        let spec = OrderSpec::parse::<Track>(&["album", "-id"]).unwrap();
        let forged = [
            vec![KeyValue::Int(0), KeyValue::Int(1)],
            vec![KeyValue::Null, KeyValue::Null],
            vec![KeyValue::Text("Blue".into()), KeyValue::Null],
            vec![
                KeyValue::Timestamp(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
                KeyValue::Bool(true),
            ],
        ];

        for key in forged {
            assert!(
                matches!(
                    spec.decode_cursor(&Cursor::encode(&key)),
                    Err(PaginationError::MalformedCursor(_))
                ),
                "{key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_decode_cursor_accepts_null_for_nullable_field() {
        let spec = OrderSpec::parse::<Track>(&["released", "id"]).unwrap();
        let cursor = spec.cursor_for(&track(3, "Blue", 1));

        assert_eq!(
            spec.decode_cursor(&cursor).unwrap(),
            vec![KeyValue::Null, KeyValue::Int(3)]
        );
    }
}
