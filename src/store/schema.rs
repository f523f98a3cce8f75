use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Field-level validation failure, reported with the offending field name.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field \"{0}\"")]
    MissingRequired(&'static str),
    #[error("field \"{field}\" must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("\"{value}\" is not an allowed value for field \"{field}\"")]
    NotAllowed {
        field: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    /// RFC 3339 timestamp or plain YYYY-MM-DD date string.
    Date,
    StringArray,
    Array,
    /// UUID string pointing at a document in another collection.
    Reference,
}

impl FieldType {
    fn expected(self) -> &'static str {
        match self {
            FieldType::String => "a string",
            FieldType::Number => "a number",
            FieldType::Boolean => "a boolean",
            FieldType::Date => "a date string",
            FieldType::StringArray => "an array of strings",
            FieldType::Array => "an array",
            FieldType::Reference => "a document id",
        }
    }
}

#[derive(Debug)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
    /// Closed set of accepted values, when the field is an enumeration.
    pub allowed: Option<&'static [&'static str]>,
}

impl FieldDef {
    const fn new(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty, required: false, allowed: None }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = Some(allowed);
        self
    }

    fn check(&self, value: &Value) -> Result<(), ValidationError> {
        let ok = match self.ty {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Date => value.as_str().map(is_date_string).unwrap_or(false),
            FieldType::StringArray => value
                .as_array()
                .map(|a| a.iter().all(Value::is_string))
                .unwrap_or(false),
            FieldType::Array => value.is_array(),
            FieldType::Reference => value
                .as_str()
                .map(|s| Uuid::parse_str(s).is_ok())
                .unwrap_or(false),
        };
        if !ok {
            return Err(ValidationError::WrongType {
                field: self.name,
                expected: self.ty.expected(),
            });
        }
        if let Some(allowed) = self.allowed {
            // Type check above guarantees a string here.
            let s = value.as_str().unwrap_or_default();
            if !allowed.contains(&s) {
                return Err(ValidationError::NotAllowed {
                    field: self.name,
                    value: s.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn is_date_string(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok() || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Declared shape of one collection. Fields not listed here are opaque to the
/// store and pass through unmodified.
#[derive(Debug)]
pub struct Schema {
    pub collection: &'static str,
    fields: &'static [FieldDef],
}

impl Schema {
    /// Validate a full candidate document before insert. Every required field
    /// must be present and non-null; declared fields must match their type.
    pub fn validate_create(&self, fields: &Map<String, Value>) -> Result<(), ValidationError> {
        for def in self.fields {
            match fields.get(def.name) {
                None | Some(Value::Null) => {
                    if def.required {
                        return Err(ValidationError::MissingRequired(def.name));
                    }
                }
                Some(value) => def.check(value)?,
            }
        }
        Ok(())
    }

    /// Validate a partial update. Only the fields present in the patch are
    /// checked; nulling out a required field is rejected.
    pub fn validate_patch(&self, fields: &Map<String, Value>) -> Result<(), ValidationError> {
        for def in self.fields {
            match fields.get(def.name) {
                Some(Value::Null) => {
                    if def.required {
                        return Err(ValidationError::MissingRequired(def.name));
                    }
                }
                Some(value) => def.check(value)?,
                None => {}
            }
        }
        Ok(())
    }
}

const PROGRAMS: &[&str] = &["Web Dev", "UX/UI", "Data Analytics", "Cybersecurity"];
const FORMATS: &[&str] = &["Full Time", "Part Time"];

static COHORTS: Schema = Schema {
    collection: "cohorts",
    fields: &[
        FieldDef::new("cohortSlug", FieldType::String).required(),
        FieldDef::new("cohortName", FieldType::String).required(),
        FieldDef::new("program", FieldType::String).one_of(PROGRAMS),
        FieldDef::new("format", FieldType::String).one_of(FORMATS),
        FieldDef::new("campus", FieldType::String),
        FieldDef::new("startDate", FieldType::Date),
        FieldDef::new("endDate", FieldType::Date),
        FieldDef::new("inProgress", FieldType::Boolean),
        FieldDef::new("programManager", FieldType::String),
        FieldDef::new("leadTeacher", FieldType::String),
        FieldDef::new("totalHours", FieldType::Number),
    ],
};

static STUDENTS: Schema = Schema {
    collection: "students",
    fields: &[
        FieldDef::new("firstName", FieldType::String).required(),
        FieldDef::new("lastName", FieldType::String).required(),
        FieldDef::new("email", FieldType::String).required(),
        FieldDef::new("phone", FieldType::String),
        FieldDef::new("linkedinUrl", FieldType::String),
        FieldDef::new("languages", FieldType::StringArray),
        FieldDef::new("program", FieldType::String),
        FieldDef::new("background", FieldType::String),
        FieldDef::new("image", FieldType::String),
        FieldDef::new("projects", FieldType::Array),
        FieldDef::new("cohort", FieldType::Reference),
    ],
};

pub fn cohorts() -> &'static Schema {
    &COHORTS
}

pub fn students() -> &'static Schema {
    &STUDENTS
}
