use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Number, Value};

use super::{is_email, PathSegment, Violation};

/// Walks the fields of one json object, collecting violations as it goes.
///
/// Getters return `None` when the field is missing or has the wrong type, in
/// which case a violation has already been recorded. Rule checks take the
/// getter's result and silently skip `None` so a missing field is reported
/// once. Callers assemble their value with defaults for the `None` cases and
/// hand it to [`Validator::finish`], which discards it if anything failed.
pub struct Validator<'a> {
    path: Vec<PathSegment>,
    object: &'a Map<String, Value>,
    violations: Vec<Violation>,
}

impl<'a> Validator<'a> {
    pub fn root(value: &'a Value) -> Result<Validator<'a>, Vec<Violation>> {
        match value {
            Value::Object(object) => Ok(Validator {
                path: vec![],
                object,
                violations: vec![],
            }),
            other => Err(vec![Violation::new(vec![], mismatch("object", other))]),
        }
    }

    fn child(&self, path: Vec<PathSegment>, object: &'a Map<String, Value>) -> Validator<'a> {
        Validator {
            path,
            object,
            violations: vec![],
        }
    }

    fn fields(&self) -> &'a Map<String, Value> {
        self.object
    }

    fn path_to(&self, key: &str) -> Vec<PathSegment> {
        let mut path = self.path.clone();
        path.push(key.into());
        path
    }

    pub fn violation(&mut self, key: &str, message: impl Into<String>) {
        let path = self.path_to(key);
        self.violations.push(Violation::new(path, message));
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn string(&mut self, key: &str) -> Option<String> {
        match self.fields().get(key) {
            None => {
                self.violation(key, "Required");
                None
            }
            Some(Value::String(value)) => Some(value.clone()),
            Some(other) => {
                self.violation(key, mismatch("string", other));
                None
            }
        }
    }

    pub fn optional_string(&mut self, key: &str) -> Option<String> {
        match self.fields().get(key) {
            None => None,
            Some(Value::String(value)) => Some(value.clone()),
            Some(other) => {
                self.violation(key, mismatch("string", other));
                None
            }
        }
    }

    /// Distinguishes an absent field (`None`) from an explicit `null`
    /// (`Some(None)`) so documents can be echoed back unchanged.
    pub fn nullable_string(&mut self, key: &str) -> Option<Option<String>> {
        match self.fields().get(key) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(Value::String(value)) => Some(Some(value.clone())),
            Some(other) => {
                self.violation(key, mismatch("string", other));
                None
            }
        }
    }

    pub fn nullable_string_list(&mut self, key: &str) -> Option<Option<Vec<String>>> {
        let elements = match self.fields().get(key) {
            None => return None,
            Some(Value::Null) => return Some(None),
            Some(Value::Array(elements)) => elements,
            Some(other) => {
                self.violation(key, mismatch("array", other));
                return None;
            }
        };

        let mut strings = Vec::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            match element {
                Value::String(value) => strings.push(value.clone()),
                other => {
                    let mut path = self.path_to(key);
                    path.push(index.into());
                    self.violations
                        .push(Violation::new(path, mismatch("string", other)));
                }
            }
        }

        Some(Some(strings))
    }

    pub fn min_chars(&mut self, key: &str, value: Option<&str>, min: usize, message: &str) {
        if let Some(value) = value {
            if value.chars().count() < min {
                self.violation(key, message);
            }
        }
    }

    pub fn max_chars(&mut self, key: &str, value: Option<&str>, max: usize, message: &str) {
        if let Some(value) = value {
            if value.chars().count() > max {
                self.violation(key, message);
            }
        }
    }

    pub fn email(&mut self, key: &str, value: Option<&str>, message: &str) {
        if let Some(value) = value {
            if !is_email(value) {
                self.violation(key, message);
            }
        }
    }

    /// Requires an ISO-8601 (RFC 3339) date-time such as `2023-01-15T10:00:00Z`.
    pub fn datetime(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value {
            if DateTime::parse_from_rfc3339(value).is_err() {
                self.violation(key, "Invalid datetime");
            }
        }
    }

    /// Reads an optional calendar date, given either as `YYYY-MM-DD` or as a
    /// full date-time whose date part is kept.
    pub fn optional_date(&mut self, key: &str) -> Option<NaiveDate> {
        let value = match self.fields().get(key) {
            None | Some(Value::Null) => return None,
            Some(Value::String(value)) => value,
            Some(other) => {
                self.violation(key, mismatch("date", other));
                return None;
            }
        };

        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Some(date);
        }
        if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
            return Some(datetime.date_naive());
        }

        self.violation(key, "Invalid date");
        None
    }

    pub fn number(&mut self, key: &str) -> Option<Number> {
        match self.fields().get(key) {
            None => {
                self.violation(key, "Required");
                None
            }
            Some(Value::Number(value)) => Some(value.clone()),
            Some(other) => {
                self.violation(key, mismatch("number", other));
                None
            }
        }
    }

    pub fn integer(&mut self, key: &str) -> Option<i64> {
        let number = self.number(key)?;
        if let Some(value) = number.as_i64() {
            return Some(value);
        }

        match number.as_f64() {
            Some(value) if value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
                Some(value as i64)
            }
            _ => {
                self.violation(key, "Expected integer, received float");
                None
            }
        }
    }

    pub fn min_number(&mut self, key: &str, value: Option<f64>, min: f64) {
        if let Some(value) = value {
            if value < min {
                self.violation(
                    key,
                    format!("Number must be greater than or equal to {}", min),
                );
            }
        }
    }

    pub fn object(&mut self, key: &str) -> Option<Validator<'a>> {
        match self.fields().get(key) {
            None => {
                self.violation(key, "Required");
                None
            }
            Some(Value::Object(object)) => Some(self.child(self.path_to(key), object)),
            Some(other) => {
                self.violation(key, mismatch("object", other));
                None
            }
        }
    }

    pub fn nullable_object(&mut self, key: &str) -> Option<Option<Validator<'a>>> {
        match self.fields().get(key) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(Value::Object(object)) => Some(Some(self.child(self.path_to(key), object))),
            Some(other) => {
                self.violation(key, mismatch("object", other));
                None
            }
        }
    }

    pub fn array(&mut self, key: &str) -> Option<&'a Vec<Value>> {
        match self.fields().get(key) {
            None => {
                self.violation(key, "Required");
                None
            }
            Some(Value::Array(elements)) => Some(elements),
            Some(other) => {
                self.violation(key, mismatch("array", other));
                None
            }
        }
    }

    pub fn min_elements(&mut self, key: &str, elements: Option<&Vec<Value>>, min: usize) {
        if let Some(elements) = elements {
            if elements.len() < min {
                self.violation(
                    key,
                    format!("Array must contain at least {} element(s)", min),
                );
            }
        }
    }

    /// Opens one object element of an array field for validation.
    pub fn element(&mut self, key: &str, index: usize, value: &'a Value) -> Option<Validator<'a>> {
        let mut path = self.path_to(key);
        path.push(index.into());

        match value {
            Value::Object(object) => Some(self.child(path, object)),
            other => {
                self.violations
                    .push(Violation::new(path, mismatch("object", other)));
                None
            }
        }
    }

    /// Takes over the violations of a nested validator.
    pub fn absorb(&mut self, child: Validator<'a>) {
        self.violations.extend(child.violations);
    }

    /// Returns the fields not named in `known`, preserved verbatim.
    pub fn extras(&self, known: &[&str]) -> Map<String, Value> {
        self.object
            .iter()
            .filter(|(key, _)| !known.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn finish<T>(self, value: T) -> Result<T, Vec<Violation>> {
        if self.violations.is_empty() {
            Ok(value)
        } else {
            Err(self.violations)
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(expected: &str, received: &Value) -> String {
    format!("Expected {}, received {}", expected, json_type(received))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn root_must_be_an_object() {
        let violations = Validator::root(&json!([1, 2])).err().unwrap();

        assert_eq!(
            violations,
            vec![Violation::new(vec![], "Expected object, received array")]
        );
    }

    #[test]
    fn missing_and_mistyped_fields_are_reported_once() {
        let value = json!({ "name": 42 });
        let mut v = Validator::root(&value).unwrap();

        let id = v.string("id");
        v.min_chars("id", id.as_deref(), 1, "too short");
        let name = v.string("name");
        v.min_chars("name", name.as_deref(), 3, "too short");

        let violations = v.finish(()).unwrap_err();
        assert_eq!(
            violations,
            vec![
                Violation::new(vec!["id".into()], "Required"),
                Violation::new(vec!["name".into()], "Expected string, received number"),
            ]
        );
    }

    #[test]
    fn nested_paths_include_indices() {
        let value = json!({ "items": [{ "quantity": 1 }, { "quantity": 0 }] });
        let mut v = Validator::root(&value).unwrap();

        let items = v.array("items").unwrap();
        for (index, item) in items.iter().enumerate() {
            let mut iv = v.element("items", index, item).unwrap();
            let quantity = iv.integer("quantity");
            iv.min_number("quantity", quantity.map(|q| q as f64), 1.0);
            v.absorb(iv);
        }

        let violations = v.finish(()).unwrap_err();
        assert_eq!(
            violations,
            vec![Violation::new(
                vec!["items".into(), 1.into(), "quantity".into()],
                "Number must be greater than or equal to 1"
            )]
        );
    }

    #[test]
    fn integers_reject_fractions() {
        let value = json!({ "a": 2.0, "b": 2.5 });
        let mut v = Validator::root(&value).unwrap();

        assert_eq!(v.integer("a"), Some(2));
        assert_eq!(v.integer("b"), None);
        assert!(!v.is_valid());
    }

    #[test]
    fn dates_accept_plain_and_full_forms() {
        let value = json!({
            "plain": "2024-07-25",
            "full": "2024-07-25T09:30:00Z",
            "bad": "next tuesday",
        });
        let mut v = Validator::root(&value).unwrap();

        let expected = NaiveDate::from_ymd_opt(2024, 7, 25);
        assert_eq!(v.optional_date("plain"), expected);
        assert_eq!(v.optional_date("full"), expected);
        assert_eq!(v.optional_date("missing"), None);
        assert_eq!(v.optional_date("bad"), None);

        let violations = v.finish(()).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].is_at("bad"));
    }

    #[test]
    fn nullable_fields_keep_explicit_nulls() {
        let value = json!({ "phone": null, "tags": ["vip", 3] });
        let mut v = Validator::root(&value).unwrap();

        assert_eq!(v.nullable_string("phone"), Some(None));
        assert_eq!(v.nullable_string("fax"), None);
        assert_eq!(
            v.nullable_string_list("tags"),
            Some(Some(vec!["vip".to_string()]))
        );

        let violations = v.finish(()).unwrap_err();
        assert_eq!(
            violations,
            vec![Violation::new(
                vec!["tags".into(), 1.into()],
                "Expected string, received number"
            )]
        );
    }

    #[test]
    fn extras_skip_known_keys() {
        let value = json!({ "id": "c1", "custom_field": "custom_value" });
        let v = Validator::root(&value).unwrap();

        let extras = v.extras(&["id"]);
        assert_eq!(extras.len(), 1);
        assert_eq!(extras["custom_field"], json!("custom_value"));
    }
}
