//! SQL rendering of an [`OrderSpec`] for keyset pagination.
//!
//! Column names are the ordering's field names, which are validated
//! against the record's `Sortable::SORT_FIELDS` and never come from input.

use catalog_pagination::{Direction, KeyValue, OrderSpec};
use sqlx::{Postgres, QueryBuilder};

/// Push a predicate selecting rows strictly after `key` in `order`.
///
/// For `(a ASC, b DESC)` this renders `((a > $1) OR (a = $2 AND b < $3))`.
pub fn push_after(builder: &mut QueryBuilder<'_, Postgres>, order: &OrderSpec, key: &[KeyValue]) {
    let fields = order.fields();

    builder.push("(");

    for (position, field) in fields.iter().enumerate() {
        if position > 0 {
            builder.push(" OR ");
        }

        builder.push("(");

        for (equal, value) in fields[..position].iter().zip(key) {
            builder.push(equal.name).push(" = ");
            push_value(builder, value);
            builder.push(" AND ");
        }

        builder.push(field.name).push(match field.direction {
            Direction::Asc => " > ",
            Direction::Desc => " < ",
        });

        if let Some(value) = key.get(position) {
            push_value(builder, value);
        } else {
            builder.push("NULL");
        }

        builder.push(")");
    }

    builder.push(")");
}

/// Push an `ORDER BY` clause for `order`.
pub fn push_order_by(builder: &mut QueryBuilder<'_, Postgres>, order: &OrderSpec) {
    builder.push(" ORDER BY ");

    let mut separated = builder.separated(", ");
    for field in order.fields() {
        separated.push(field.name);
        separated.push_unseparated(match field.direction {
            Direction::Asc => " ASC",
            Direction::Desc => " DESC",
        });
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: &KeyValue) {
    match value {
        KeyValue::Null => builder.push("NULL"),
        KeyValue::Bool(value) => builder.push_bind(*value),
        KeyValue::Int(value) => builder.push_bind(*value),
        KeyValue::Text(value) => builder.push_bind(value.clone()),
        KeyValue::Uuid(value) => builder.push_bind(*value),
        KeyValue::Timestamp(value) => builder.push_bind(*value),
    };
}
