//! Validation and normalisation of raw rc-file objects.

use std::collections::BTreeMap;

use hearth_config::Directories;
use serde_json::{Map, Value};
use tracing::debug;

use super::{
    AssetsBundler, AssetsBundlerConfig, BundlerCommand, DEFAULT_TEST_TIMEOUT_MS, Manifest,
    MetaFileEntry, ModuleSpecifier, PreloadEntry, ProviderEntry, TestConfig, TestSuite,
};
use crate::environment::{AppEnvironment, EnvironmentSet};
use crate::error::ManifestError;
use crate::glob::glob_parent;

const LOG_TARGET: &str = "hearth::manifest";

const ENVIRONMENT_SHAPE: &str = "a non-empty list of \"web\", \"console\", \"test\" or \"repl\"";
const STRING_LIST_SHAPE: &str = "a list of strings";
const STRING_MAP_SHAPE: &str = "an object with string values";

pub(super) fn parse(raw: &Value) -> Result<Manifest, ManifestError> {
    let empty = Map::new();
    let root = match raw {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => return Err(invalid("manifest", "an object", other)),
    };

    let manifest = Manifest {
        typescript: optional_bool(root, "typescript", "typescript", raw)?.unwrap_or(true),
        directories: parse_directories(root.get("directories"))?,
        preloads: parse_list(root.get("preloads"), "preloads", parse_preload)?,
        meta_files: parse_list(root.get("metaFiles"), "metaFiles", parse_meta_file)?,
        providers: parse_list(root.get("providers"), "providers", parse_provider)?,
        commands: parse_list(root.get("commands"), "commands", parse_command)?,
        command_aliases: parse_aliases(root)?,
        tests: parse_tests(root.get("tests"))?,
        assets_bundler: parse_assets_bundler(root.get("assetsBundler"))?,
        raw: raw.clone(),
    };

    debug!(
        target: LOG_TARGET,
        providers = manifest.providers.len(),
        preloads = manifest.preloads.len(),
        commands = manifest.commands.len(),
        suites = manifest.tests.suites.len(),
        "manifest parsed"
    );
    Ok(manifest)
}

fn render(value: &Value) -> String {
    value.to_string()
}

fn invalid(field: impl Into<String>, expected: &'static str, entry: &Value) -> ManifestError {
    ManifestError::InvalidField {
        field: field.into(),
        expected,
        entry: render(entry),
    }
}

/// Absent and `null` both mean "use the default".
fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

fn parse_list<T>(
    value: Option<&Value>,
    field: &str,
    parse_item: fn(&Value) -> Result<T, ManifestError>,
) -> Result<Vec<T>, ManifestError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items.iter().map(parse_item).collect(),
        Some(other) => Err(invalid(field, "a list", other)),
    }
}

fn optional_bool(
    map: &Map<String, Value>,
    key: &str,
    field: &str,
    entry: &Value,
) -> Result<Option<bool>, ManifestError> {
    match present(map, key) {
        None => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(_) => Err(invalid(field, "a boolean", entry)),
    }
}

fn optional_u64(
    map: &Map<String, Value>,
    key: &str,
    field: &str,
    entry: &Value,
) -> Result<Option<u64>, ManifestError> {
    match present(map, key) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| invalid(field, "a non-negative integer", entry)),
    }
}

fn parse_environment(
    map: &Map<String, Value>,
    field: &str,
    entry: &Value,
) -> Result<EnvironmentSet, ManifestError> {
    let Some(value) = present(map, "environment") else {
        return Ok(EnvironmentSet::all());
    };
    let Value::Array(names) = value else {
        return Err(invalid(field, ENVIRONMENT_SHAPE, entry));
    };
    let environments = names
        .iter()
        .map(|name| {
            name.as_str()
                .and_then(|text| text.parse::<AppEnvironment>().ok())
                .filter(|environment| environment.is_known())
                .ok_or_else(|| invalid(field, ENVIRONMENT_SHAPE, entry))
        })
        .collect::<Result<Vec<_>, _>>()?;
    EnvironmentSet::new(environments).ok_or_else(|| invalid(field, ENVIRONMENT_SHAPE, entry))
}

/// Outcome of reading the `file` property of an object-form entry.
enum FileProperty {
    Missing,
    Invalid,
    Valid(ModuleSpecifier),
}

fn file_property(map: &Map<String, Value>) -> FileProperty {
    match present(map, "file") {
        None => FileProperty::Missing,
        Some(Value::String(file)) if !file.trim().is_empty() => {
            FileProperty::Valid(ModuleSpecifier::new(file.as_str()))
        }
        Some(_) => FileProperty::Invalid,
    }
}

fn parse_preload(entry: &Value) -> Result<PreloadEntry, ManifestError> {
    let map = match entry {
        Value::String(file) if !file.trim().is_empty() => {
            return Ok(PreloadEntry::new(file.as_str(), EnvironmentSet::all()));
        }
        Value::Object(map) => map,
        _ => return Err(ManifestError::InvalidPreloadFile { entry: render(entry) }),
    };
    let file = match file_property(map) {
        FileProperty::Missing => {
            return Err(ManifestError::MissingPreloadFile { entry: render(entry) });
        }
        FileProperty::Invalid => {
            return Err(ManifestError::InvalidPreloadFile { entry: render(entry) });
        }
        FileProperty::Valid(file) => file,
    };
    let environment = parse_environment(map, "preloads.environment", entry)?;
    let optional = optional_bool(map, "optional", "preloads.optional", entry)?.unwrap_or(false);
    Ok(PreloadEntry::new(file, environment).with_optional(optional))
}

fn parse_provider(entry: &Value) -> Result<ProviderEntry, ManifestError> {
    let map = match entry {
        Value::String(file) if !file.trim().is_empty() => {
            return Ok(ProviderEntry::new(file.as_str(), EnvironmentSet::all()));
        }
        Value::Object(map) => map,
        _ => return Err(ManifestError::InvalidProviderFile { entry: render(entry) }),
    };
    let file = match file_property(map) {
        FileProperty::Missing => {
            return Err(ManifestError::MissingProviderFile { entry: render(entry) });
        }
        FileProperty::Invalid => {
            return Err(ManifestError::InvalidProviderFile { entry: render(entry) });
        }
        FileProperty::Valid(file) => file,
    };
    let environment = parse_environment(map, "providers.environment", entry)?;
    Ok(ProviderEntry::new(file, environment))
}

fn parse_meta_file(entry: &Value) -> Result<MetaFileEntry, ManifestError> {
    let map = match entry {
        Value::String(pattern) => return Ok(MetaFileEntry::new(pattern.as_str(), true)),
        Value::Object(map) => map,
        other => {
            return Err(invalid(
                "metaFiles",
                "a glob string or an object with a pattern",
                other,
            ));
        }
    };
    let pattern = match present(map, "pattern") {
        None => return Err(ManifestError::MissingMetaFilePattern { entry: render(entry) }),
        Some(Value::String(pattern)) => pattern.as_str(),
        Some(_) => return Err(invalid("metaFiles.pattern", "a glob string", entry)),
    };
    let reload_server =
        optional_bool(map, "reloadServer", "metaFiles.reloadServer", entry)?.unwrap_or(true);
    Ok(MetaFileEntry::new(pattern, reload_server))
}

fn parse_command(entry: &Value) -> Result<ModuleSpecifier, ManifestError> {
    match entry {
        Value::String(specifier) => Ok(ModuleSpecifier::new(specifier.as_str())),
        other => Err(invalid("commands", "a module specifier string", other)),
    }
}

fn parse_string_map(value: &Value, field: &str) -> Result<BTreeMap<String, String>, ManifestError> {
    let Value::Object(map) = value else {
        return Err(invalid(field, STRING_MAP_SHAPE, value));
    };
    map.iter()
        .map(|(key, item)| match item {
            Value::String(text) => Ok((key.clone(), text.clone())),
            _ => Err(invalid(format!("{field}.{key}"), "a string", value)),
        })
        .collect()
}

fn parse_directories(value: Option<&Value>) -> Result<Directories, ManifestError> {
    let defaults = hearth_config::default_directories();
    match value {
        None | Some(Value::Null) => Ok(defaults),
        Some(user) => {
            let overrides: Directories = parse_string_map(user, "directories")?
                .into_iter()
                .collect();
            Ok(defaults.merged_with(overrides))
        }
    }
}

fn parse_aliases(root: &Map<String, Value>) -> Result<BTreeMap<String, String>, ManifestError> {
    if let Some(aliases) = present(root, "commandsAliases") {
        return parse_string_map(aliases, "commandsAliases");
    }
    present(root, "commandAliases").map_or_else(
        || Ok(BTreeMap::new()),
        |aliases| parse_string_map(aliases, "commandAliases"),
    )
}

fn parse_tests(value: Option<&Value>) -> Result<TestConfig, ManifestError> {
    let map = match value {
        None | Some(Value::Null) => return Ok(TestConfig::default()),
        Some(Value::Object(map)) => map,
        Some(other) => return Err(invalid("tests", "an object", other)),
    };
    let entry = value.unwrap_or(&Value::Null);
    Ok(TestConfig {
        suites: parse_list(map.get("suites"), "tests.suites", parse_suite)?,
        timeout: optional_u64(map, "timeout", "tests.timeout", entry)?
            .unwrap_or(DEFAULT_TEST_TIMEOUT_MS),
        force_exit: optional_bool(map, "forceExit", "tests.forceExit", entry)?.unwrap_or(true),
    })
}

fn parse_suite(entry: &Value) -> Result<TestSuite, ManifestError> {
    let Value::Object(map) = entry else {
        return Err(invalid(
            "tests.suites",
            "an object with name and files",
            entry,
        ));
    };
    let name = match present(map, "name") {
        None => return Err(ManifestError::MissingSuiteName { entry: render(entry) }),
        Some(Value::String(name)) => name.clone(),
        Some(_) => return Err(invalid("tests.suites.name", "a string", entry)),
    };
    let files = match present(map, "files") {
        None => {
            return Err(ManifestError::MissingSuiteFiles {
                name,
                entry: render(entry),
            });
        }
        Some(Value::String(file)) => vec![file.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| invalid("tests.suites.files", STRING_LIST_SHAPE, entry))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(invalid("tests.suites.files", STRING_LIST_SHAPE, entry)),
    };
    let directories = files.iter().map(|file| glob_parent(file)).collect();
    let timeout = optional_u64(map, "timeout", "tests.suites.timeout", entry)?;
    Ok(TestSuite {
        name,
        files,
        directories,
        timeout,
    })
}

fn parse_assets_bundler(value: Option<&Value>) -> Result<AssetsBundler, ManifestError> {
    let map = match value {
        None | Some(Value::Null) => return Ok(AssetsBundler::Unset),
        Some(Value::Bool(false)) => return Ok(AssetsBundler::Disabled),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(invalid(
                "assetsBundler",
                "false or an object with name, devServer and build",
                other,
            ));
        }
    };
    let entry = value.unwrap_or(&Value::Null);
    let (Some(name), Some(dev_server), Some(build)) = (
        present(map, "name"),
        present(map, "devServer"),
        present(map, "build"),
    ) else {
        return Err(first_missing_bundler_field(map, entry));
    };
    let Value::String(name) = name else {
        return Err(invalid("assetsBundler.name", "a string", entry));
    };
    Ok(AssetsBundler::Enabled(AssetsBundlerConfig {
        name: name.clone(),
        dev_server: parse_bundler_command(dev_server, "assetsBundler.devServer", entry)?,
        build: parse_bundler_command(build, "assetsBundler.build", entry)?,
    }))
}

fn first_missing_bundler_field(map: &Map<String, Value>, entry: &Value) -> ManifestError {
    let rendered = render(entry);
    if present(map, "name").is_none() {
        ManifestError::MissingBundlerName { entry: rendered }
    } else if present(map, "devServer").is_none() {
        ManifestError::MissingBundlerDevServer { entry: rendered }
    } else {
        ManifestError::MissingBundlerBuild { entry: rendered }
    }
}

fn parse_bundler_command(
    value: &Value,
    field: &str,
    entry: &Value,
) -> Result<BundlerCommand, ManifestError> {
    const SHAPE: &str = "an object with a command string and optional args list";
    let Value::Object(map) = value else {
        return Err(invalid(field, SHAPE, entry));
    };
    let Some(Value::String(command)) = present(map, "command") else {
        return Err(invalid(field, SHAPE, entry));
    };
    let args = match present(map, "args") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| invalid(format!("{field}.args"), STRING_LIST_SHAPE, entry))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(invalid(format!("{field}.args"), STRING_LIST_SHAPE, entry)),
    };
    Ok(BundlerCommand::new(command.as_str(), args))
}
