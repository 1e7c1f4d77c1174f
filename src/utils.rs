// This file is part of the terraform-provider-forwardnetworks project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::borrow::Cow;
use std::cell::RefCell;

use tf_provider::schema::{Attribute, AttributeConstraint, AttributeType, Description};
use tf_provider::value::{Value, ValueList, ValueNumber, ValueString};
use tf_provider::{AttributePath, Diagnostics, schema::Schema};

pub(crate) trait WithSchema {
    fn schema() -> Schema;
}

pub(crate) trait WithNormalize {
    fn normalize(&mut self, diags: &mut Diagnostics);
}

/// Turn a failed call into an error diagnostic
pub(crate) trait ReportError<T> {
    fn or_report(self, diags: &mut Diagnostics, summary: &'static str) -> Option<T>;
    fn or_report_at(
        self,
        diags: &mut Diagnostics,
        summary: &'static str,
        attr_path: AttributePath,
    ) -> Option<T>;
}

impl<T, E: std::fmt::Display> ReportError<T> for Result<T, E> {
    fn or_report(self, diags: &mut Diagnostics, summary: &'static str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                diags.root_error(summary, err.to_string());
                None
            }
        }
    }

    fn or_report_at(
        self,
        diags: &mut Diagnostics,
        summary: &'static str,
        attr_path: AttributePath,
    ) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                diags.error(summary, err.to_string(), attr_path);
                None
            }
        }
    }
}

pub(crate) fn attribute(
    attr_type: AttributeType,
    constraint: AttributeConstraint,
    description: &str,
) -> Attribute {
    Attribute {
        attr_type,
        description: Description::plain(description),
        constraint,
        ..Default::default()
    }
}

pub(crate) fn sensitive(attribute: Attribute) -> Attribute {
    Attribute {
        sensitive: true,
        ..attribute
    }
}

pub(crate) fn list_of(attr_type: AttributeType) -> AttributeType {
    AttributeType::List(Box::new(attr_type))
}

pub(crate) fn map_of(attr_type: AttributeType) -> AttributeType {
    AttributeType::Map(Box::new(attr_type))
}

pub(crate) fn string_value<'a>(s: impl Into<String>) -> ValueString<'a> {
    Value::Value(Cow::Owned(s.into()))
}

/// Absent and empty strings both map to null
pub(crate) fn optional_string<'a>(s: Option<String>) -> ValueString<'a> {
    match s {
        Some(s) if !s.is_empty() => Value::Value(Cow::Owned(s)),
        _ => Value::Null,
    }
}

/// The API omits empty strings: an empty answer is null, unless the state
/// already held the empty string
pub(crate) fn answered_string<'a>(current: &ValueString<'a>, answer: String) -> ValueString<'a> {
    match current {
        Value::Value(value) if answer.is_empty() && value.is_empty() => current.clone(),
        _ => optional_string(Some(answer)),
    }
}

/// Same as [`answered_string`], for lists of strings
pub(crate) fn answered_list<'a>(
    current: &ValueList<ValueString<'a>>,
    answer: Vec<String>,
) -> ValueList<ValueString<'a>> {
    match current {
        Value::Value(list) if answer.is_empty() && list.is_empty() => Value::Value(Vec::new()),
        _ => optional_string_list(answer),
    }
}

pub(crate) fn non_empty(value: &ValueString<'_>) -> Option<String> {
    Some(value.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

pub(crate) fn value_or_null<T>(value: Option<T>) -> Value<T> {
    value.map_or(Value::Null, Value::Value)
}

pub(crate) fn option_of<T: Clone>(value: &Value<T>) -> Option<T> {
    value.as_ref_option().cloned()
}

pub(crate) fn string_list<'a, I, S>(items: I) -> ValueList<ValueString<'a>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Value::Value(items.into_iter().map(string_value).collect())
}

/// Same as [`string_list`], but an empty list is stored as null
pub(crate) fn optional_string_list<'a, I, S>(items: I) -> ValueList<ValueString<'a>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    match string_list(items) {
        Value::Value(list) if list.is_empty() => Value::Null,
        list => list,
    }
}

pub(crate) fn list_of_strings(list: &ValueList<ValueString<'_>>) -> Vec<String> {
    list.iter()
        .flatten()
        .map(|s| s.as_str().to_owned())
        .collect()
}

pub(crate) fn list_of_numbers(list: &ValueList<ValueNumber>) -> Vec<i64> {
    list.iter().flatten().filter_map(option_of).collect()
}

/// Decode a comma separated string, the empty string being the empty list
pub(crate) fn split_csv(input: &str) -> Vec<String> {
    if input.is_empty() {
        Vec::new()
    } else {
        input.split(',').map(str::to_owned).collect()
    }
}

pub(crate) fn parse_bool(input: &str) -> bool {
    input.eq_ignore_ascii_case("true")
}

pub(crate) fn now_millis() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

pub struct DisplayJoiner<'a, T, I>
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    iter: RefCell<T>,
    sep: &'a str,
}

pub trait DisplayJoinable {
    type Joiner<'a>;
    fn join_with(self, sep: &str) -> Self::Joiner<'_>;
}

impl<T, I> DisplayJoinable for T
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    type Joiner<'a> = DisplayJoiner<'a, T, I>;

    fn join_with(self, sep: &str) -> Self::Joiner<'_> {
        DisplayJoiner {
            iter: RefCell::new(self),
            sep,
        }
    }
}

impl<'a, T, I> std::fmt::Display for DisplayJoiner<'a, T, I>
where
    T: Iterator<Item = I>,
    I: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut sep = "";
        let mut iter = self.iter.try_borrow_mut().or(Err(std::fmt::Error))?;
        for elt in iter.by_ref() {
            f.write_str(sep)?;
            f.write_fmt(format_args!("{elt}"))?;
            sep = self.sep;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn csv_empty_is_empty_list() {
        assert!(split_csv("").is_empty());
        assert_eq!(split_csv("a,b"), vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn bool_parsing_is_case_insensitive() {
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("true"));
        assert!(!parse_bool("yes"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn join_with_separator() {
        assert_eq!(["a", "b", "c"].iter().join_with(", ").to_string(), "a, b, c");
        assert_eq!(std::iter::empty::<u8>().join_with(",").to_string(), "");
    }

    #[test]
    fn optional_values() {
        assert!(optional_string(Some(String::new())).is_null());
        assert!(optional_string(None).is_null());
        assert_eq!(optional_string(Some("x".into())).as_str(), "x");
        assert!(optional_string_list(Vec::<String>::new()).is_null());
        assert_eq!(
            answered_string(&Value::Value(Cow::Borrowed("")), String::new()).as_str(),
            ""
        );
        assert!(answered_string(&Value::Null, String::new()).is_null());
        assert!(answered_string(&string_value("stale"), String::new()).is_null());
        assert_eq!(
            answered_list(&Value::Value(vec![]), vec![]),
            Value::Value(vec![])
        );
        assert!(answered_list(&Value::Null, vec![]).is_null());
        assert_eq!(
            list_of_strings(&string_list(["a", "b"])),
            vec!["a".to_owned(), "b".to_owned()]
        );
    }

    proptest! {
        #[test]
        fn csv_split_rejoins(items in prop::collection::vec("[a-z0-9.-]{1,8}", 1..6)) {
            let joined = items.join(",");
            prop_assert_eq!(split_csv(&joined), items);
        }
    }
}
