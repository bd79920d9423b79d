use tiberius::Query;

use crate::params::Parameters;
use crate::types::RowValues;

/// Build a query with every parameter bound, in order, as `@P1..@Pn`.
pub(crate) fn bind_query<'a>(sql: &'a str, params: &Parameters) -> Query<'a> {
    let mut query = Query::new(sql);
    for (_, value) in params.iter() {
        bind_value(&mut query, value);
    }
    query
}

fn bind_value(query: &mut Query<'_>, value: &RowValues) {
    match value {
        RowValues::Int(i) => query.bind(*i),
        RowValues::Float(f) => query.bind(*f),
        RowValues::Text(s) => query.bind(s.clone()),
        RowValues::Bool(b) => query.bind(*b),
        RowValues::Timestamp(dt) => query.bind(*dt),
        RowValues::Null => query.bind(Option::<String>::None),
        RowValues::JSON(value) => query.bind(value.to_string()),
        RowValues::Blob(bytes) => query.bind(bytes.clone()),
    }
}
