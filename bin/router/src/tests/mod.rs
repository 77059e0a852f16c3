use std::path::PathBuf;

use hive_fusion_config::{parse_yaml_config, FusionConfig};
use hive_fusion_executor::Value;

use crate::cli::SourceArg;
use crate::compose::{compose_sources, load_source_schemas, render_diagnostics};
use crate::error::CliError;
use crate::execute::parse_variables;

fn fixture(name: &str) -> SourceArg {
    SourceArg {
        name: name.to_string(),
        path: PathBuf::from(format!("./src/tests/fixtures/{}.graphql", name)),
    }
}

#[test]
fn composes_source_schemas_given_as_arguments() {
    let result =
        compose_sources(&FusionConfig::default(), &[fixture("catalog"), fixture("pricing")])
            .unwrap();

    assert!(result.is_success(), "{}", render_diagnostics(&result));
    let sdl = result.schema().to_sdl();
    assert!(sdl.contains("type Product"));
    assert!(sdl.contains(r#"@source(schema: "pricing")"#));

    let client_sdl = result.schema().to_client_sdl();
    assert!(!client_sdl.contains("@source"));
    assert!(!client_sdl.contains("internalCode"));
}

#[test]
fn composes_configured_source_schemas_in_order() {
    let config = parse_yaml_config(
        r#"
source_schemas:
  pricing:
    schema_path: ./src/tests/fixtures/pricing.graphql
  catalog:
    schema_path: ./src/tests/fixtures/catalog.graphql
"#
        .to_string(),
    )
    .unwrap();

    let sources = load_source_schemas(&config, &[]).unwrap();

    assert_eq!(
        sources.iter().map(|source| source.name()).collect::<Vec<_>>(),
        vec!["pricing", "catalog"]
    );
}

#[test]
fn reports_composition_errors() {
    let result = compose_sources(
        &FusionConfig::default(),
        &[fixture("catalog"), fixture("conflicting")],
    )
    .unwrap();

    assert!(!result.is_success());
    assert!(render_diagnostics(&result)
        .lines()
        .any(|line| line.starts_with("[error] OUTPUT_FIELD_TYPES_NOT_MERGEABLE")));
}

#[test]
fn nothing_to_compose_is_an_error() {
    let error = load_source_schemas(&FusionConfig::default(), &[]).unwrap_err();
    assert!(matches!(error, CliError::NoSourceSchemas));
}

#[test]
fn missing_schema_file_is_reported() {
    let error = load_source_schemas(&FusionConfig::default(), &[fixture("missing")]).unwrap_err();

    assert!(matches!(error, CliError::ReadFileError(ref path, _) if path.ends_with("missing.graphql")));
}

#[test]
fn variables_must_be_an_object() {
    let variables = parse_variables(Some(r#"{"id":"1","limit":10}"#)).unwrap();
    assert_eq!(
        variables.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["id", "limit"]
    );
    assert_eq!(variables.get("id"), Some(&Value::string("1")));

    assert!(parse_variables(None).unwrap().is_empty());
    assert!(matches!(
        parse_variables(Some("[1, 2]")),
        Err(CliError::InvalidVariables(_))
    ));
    assert!(matches!(
        parse_variables(Some("{")),
        Err(CliError::InvalidVariables(_))
    ));
}
