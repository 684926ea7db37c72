mod common;

use std::collections::HashMap;

use cgt_cli::CgtConfig;
use cgt_cli::CliError;
use cgt_cli::WrapConfig;
use cgt_cli::load_data_file;
use cgt_cli::parse_assignment;
use cgt_core::AnyEmptyResult;
use cgt_core::Value;
use rstest::rstest;
use similar_asserts::assert_eq;

const TEMPLATE: &str = "[[[name]]] [[[other]]]\n";

fn write_layered_project(root: &std::path::Path) -> std::io::Result<()> {
	std::fs::write(root.join("t.in"), TEMPLATE)?;
	std::fs::write(root.join("data.yaml"), "name: data\nother: from-yaml\n")?;
	std::fs::write(
		root.join("cgt.toml"),
		"[values]\nname = \"config\"\n\n[data]\nfiles = [\"data.yaml\"]\n",
	)
}

#[test]
fn config_values_override_data_files() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_layered_project(tmp.path())?;

	common::cgt_cmd()
		.current_dir(tmp.path())
		.args(["expand", "t.in"])
		.assert()
		.success()
		.stdout("config from-yaml\n");

	Ok(())
}

#[test]
fn values_files_and_set_override_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_layered_project(tmp.path())?;
	std::fs::write(
		tmp.path().join("override.json"),
		r#"{ "name": "file", "other": "json" }"#,
	)?;

	common::cgt_cmd()
		.current_dir(tmp.path())
		.args(["expand", "t.in", "--values", "override.json"])
		.assert()
		.success()
		.stdout("file json\n");

	common::cgt_cmd()
		.current_dir(tmp.path())
		.args([
			"expand",
			"t.in",
			"--values",
			"override.json",
			"--set",
			"name=cli",
		])
		.assert()
		.success()
		.stdout("cli json\n");

	Ok(())
}

#[test]
fn dot_config_directory_resolves_data_from_project_root() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join(".config"))?;
	std::fs::write(tmp.path().join("t.in"), TEMPLATE)?;
	std::fs::write(
		tmp.path().join("data.toml"),
		"name = \"toml\"\nother = 3\n",
	)?;
	std::fs::write(
		tmp.path().join(".config/cgt.toml"),
		"[data]\nfiles = [\"data.toml\"]\n",
	)?;

	common::cgt_cmd()
		.current_dir(tmp.path())
		.args(["expand", "t.in"])
		.assert()
		.success()
		.stdout("toml 3\n");

	Ok(())
}

#[test]
fn explicit_config_flag_wins_over_discovery() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_layered_project(tmp.path())?;
	std::fs::write(
		tmp.path().join("other.toml"),
		"[values]\nname = \"explicit\"\nother = true\n",
	)?;

	common::cgt_cmd()
		.current_dir(tmp.path())
		.args(["--config", "other.toml", "expand", "t.in"])
		.assert()
		.success()
		.stdout("explicit true\n");

	Ok(())
}

#[test]
fn invalid_config_is_reported() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("t.in"), TEMPLATE)?;
	std::fs::write(tmp.path().join("cgt.toml"), "[unknown]\nkey = 1\n")?;

	common::cgt_cmd()
		.current_dir(tmp.path())
		.args(["expand", "t.in"])
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}

#[rstest]
#[case::first("cgt.toml", &["cgt.toml", ".cgt.toml", ".config/cgt.toml"])]
#[case::dotfile(".cgt.toml", &[".cgt.toml", ".config/cgt.toml"])]
#[case::config_dir(".config/cgt.toml", &[".config/cgt.toml"])]
fn resolve_path_follows_candidate_order(
	#[case] expected: &str,
	#[case] present: &[&str],
) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join(".config"))?;
	for file in present {
		std::fs::write(tmp.path().join(file), "")?;
	}

	assert_eq!(
		CgtConfig::resolve_path(tmp.path()),
		Some(tmp.path().join(expected))
	);

	Ok(())
}

#[test]
fn missing_config_uses_defaults() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let loaded = CgtConfig::load(None, tmp.path())?;

	assert!(loaded.path.is_none());
	assert!(loaded.config.values.is_empty());
	assert_eq!(loaded.config.wrap, WrapConfig::default());
	assert_eq!(loaded.load_values()?, HashMap::new());

	Ok(())
}

#[test]
fn json_data_files_map_onto_values() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let path = tmp.path().join("data.json");
	std::fs::write(
		&path,
		r#"{
			"flag": true,
			"count": 3,
			"ratio": 1.5,
			"name": "x",
			"nothing": null,
			"rows": ["a", 2],
			"nested": { "b": 1 }
		}"#,
	)?;

	let values = load_data_file(&path)?;

	assert_eq!(values["flag"], Value::Bool(true));
	assert_eq!(values["count"], Value::Int(3));
	assert_eq!(values["ratio"], Value::Float(1.5));
	assert_eq!(values["name"], Value::from("x"));
	assert_eq!(values["nothing"], Value::from(""));
	assert_eq!(values["rows"], Value::from(["a", "2"]));
	assert_eq!(values["nested"], Value::from(r#"{"b":1}"#));

	Ok(())
}

#[test]
fn data_files_must_hold_a_table() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let path = tmp.path().join("data.json");
	std::fs::write(&path, "[1, 2]")?;

	let result = load_data_file(&path);
	assert!(matches!(result, Err(CliError::DataFile { .. })));

	Ok(())
}

#[rstest]
#[case::simple("key=value", ("key", "value"))]
#[case::empty_value("key=", ("key", ""))]
#[case::equals_in_value("expr=a=b", ("expr", "a=b"))]
fn parse_assignments(#[case] text: &str, #[case] expected: (&str, &str)) {
	assert_eq!(
		parse_assignment(text),
		Ok((expected.0.to_string(), expected.1.to_string()))
	);
}

#[rstest]
#[case::missing_equals("key")]
#[case::missing_key("=value")]
fn parse_invalid_assignments(#[case] text: &str) {
	assert!(parse_assignment(text).is_err());
}
