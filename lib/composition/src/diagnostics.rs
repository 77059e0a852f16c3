use std::fmt::{self, Display};

use serde::Serialize;

use crate::coordinate::SchemaCoordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Machine-readable diagnostic codes, following the composite-schemas error codes where
/// one exists.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    InvalidDirective,
    DuplicateSourceSchemaName,
    TypeKindMismatch,
    OutputFieldTypesNotMergeable,
    InputFieldTypesNotMergeable,
    ArgumentTypesNotMergeable,
    FieldArgumentSetsMismatch,
    SourceNameConflict,
    EmptyMergedObjectType,
    EmptyMergedInterfaceType,
    EmptyMergedUnionType,
    EmptyMergedEnumType,
    EmptyMergedInputObjectType,
    ImplementedByInaccessible,
    InterfaceFieldNotImplemented,
    DefaultValueUsesInaccessible,
    ReferenceToInaccessibleType,
    RequiredInputFieldMissingInSomeSchema,
    RequiredInputFieldOrArgumentInaccessible,
    KeyInvalidSyntax,
    KeyInvalidFields,
    RequireInvalidSyntax,
    RequireInvalidFields,
    IsInvalidSyntax,
    IsInvalidFields,
    IsInvalidUsage,
    QueryRootTypeInaccessible,
    NoQueries,
    EnumValuesMismatch,
    SourceSchemaNotFound,
}

/// One composition finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub coordinates: Vec<SchemaCoordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_schema: Option<String>,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            code,
            message: message.into(),
            coordinates: Vec::new(),
            source_schema: None,
        }
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error(code, message)
        }
    }

    pub fn with_coordinate(mut self, coordinate: SchemaCoordinate) -> Self {
        self.coordinates.push(coordinate);
        self
    }

    pub fn with_source_schema(mut self, source_schema: impl Into<String>) -> Self {
        self.source_schema = Some(source_schema.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.code)?;
        if let Some(coordinate) = self.coordinates.first() {
            write!(f, " {}", coordinate)?;
        }
        if let Some(source_schema) = &self.source_schema {
            write!(f, " ({})", source_schema)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Warnings and errors produced by composition, in the order they were raised.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.0.extend(diagnostics);
    }

    /// Is any of the diagnostics an error?
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(Diagnostic::is_error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn iter_errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|diagnostic| diagnostic.is_error())
    }

    pub fn iter_warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|diagnostic| !diagnostic.is_error())
    }

    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(move |diagnostic| diagnostic.code == code)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.0 {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_diagnostic_line() {
        let diagnostic = Diagnostic::error(
            DiagnosticCode::OutputFieldTypesNotMergeable,
            "cannot merge \"String\" with \"Int\"",
        )
        .with_coordinate(SchemaCoordinate::member("Product", "name"))
        .with_source_schema("pricing");

        insta::assert_snapshot!(format!("{}", diagnostic), @r#"[error] OUTPUT_FIELD_TYPES_NOT_MERGEABLE Product.name (pricing): cannot merge "String" with "Int""#);
    }

    #[test]
    fn renders_warnings_in_lowercase() {
        let diagnostic = Diagnostic::warning(
            DiagnosticCode::SourceSchemaNotFound,
            "\"billing\" is not part of the composition",
        )
        .with_coordinate(SchemaCoordinate::member("Product", "total"));

        assert_eq!(Severity::Warning.to_string(), "warning");
        insta::assert_snapshot!(format!("{}", diagnostic), @r#"[warning] SOURCE_SCHEMA_NOT_FOUND Product.total: "billing" is not part of the composition"#);
    }
}
