//! ---
//! mc_section: "03-configuration"
//! mc_subsection: "module"
//! mc_type: "source"
//! mc_scope: "code"
//! mc_description: "Module definitions, configurations, and builders."
//! mc_version: "v0.0.0-prealpha"
//! mc_owner: "tbd"
//! ---
use indexmap::IndexMap;
use modcon_graph::{Graph, GraphError};
use modcon_params::{BracketParser, ParameterParser, ParameterSet};
use tracing::debug;

use crate::configuration::Configuration;
use crate::definition::ModuleDefinition;
use crate::error::{ConfigError, MissingPrerequisite, Result};

const NAME_KEY: &str = "name";
const CLASS_KEY: &str = "class";
const REQUIREMENT_KEY: &str = "requirement";
const PREDECESSOR_KEY: &str = "predecessor";
const CONFIGURATION_KEY: &str = "configuration";
const MODULE_KEY: &str = "module";
const EXECUTION_KEY: &str = "execution";

const DEFINITION_KEYS: &[&str] = &[
    NAME_KEY,
    CLASS_KEY,
    REQUIREMENT_KEY,
    PREDECESSOR_KEY,
    CONFIGURATION_KEY,
];
const CONFIGURATION_KEYS: &[&str] = &[MODULE_KEY, EXECUTION_KEY];

/// Builds a [`ModuleDefinition`] from the body of a `module=[...]` block.
#[derive(Debug, Clone)]
pub struct ModuleDefinitionBuilder<P = BracketParser> {
    parser: P,
}

impl Default for ModuleDefinitionBuilder<BracketParser> {
    fn default() -> Self {
        Self::new(BracketParser::new())
    }
}

impl<P: ParameterParser> ModuleDefinitionBuilder<P> {
    /// Create a builder using `parser` for the block text.
    pub fn new(parser: P) -> Self {
        Self { parser }
    }

    /// Parse and validate one module block.
    pub fn build(&self, raw: &str) -> Result<ModuleDefinition> {
        let parameters = self.parser.parse(raw)?;
        Self::from_parameters(&parameters)
    }

    /// Construct a definition from already parsed parameters.
    pub fn from_parameters(parameters: &ParameterSet) -> Result<ModuleDefinition> {
        parameters.check_keys(DEFINITION_KEYS)?;
        let name = parameters.get(NAME_KEY)?;
        let class = parameters.get(CLASS_KEY)?;
        let configuration = parameters.get_optional(CONFIGURATION_KEY)?.unwrap_or_default();
        ModuleDefinition::new(
            name,
            class,
            owned(parameters.list(REQUIREMENT_KEY)),
            owned(parameters.list(PREDECESSOR_KEY)),
            configuration,
        )
    }
}

/// Builds an ordered [`Configuration`] from full specification text.
#[derive(Debug, Clone)]
pub struct ConfigurationBuilder<P = BracketParser> {
    parser: P,
}

impl Default for ConfigurationBuilder<BracketParser> {
    fn default() -> Self {
        Self::new(BracketParser::new())
    }
}

impl<P: ParameterParser> ConfigurationBuilder<P> {
    /// Create a builder using `parser` for the top level and module blocks.
    pub fn new(parser: P) -> Self {
        Self { parser }
    }

    /// Parse, validate, and order a specification.
    pub fn build(&self, raw: &str) -> Result<Configuration> {
        let parameters = self.parser.parse(raw)?;
        parameters.check_keys(CONFIGURATION_KEYS)?;
        let execution = parameters.get_optional(EXECUTION_KEY)?.map(str::to_owned);

        let mut definitions: IndexMap<String, ModuleDefinition> = IndexMap::new();
        for (index, block) in parameters.list(MODULE_KEY).into_iter().enumerate() {
            let set = self
                .parser
                .parse(block)
                .map_err(|source| ConfigError::ModuleBlock { index, source })?;
            let definition =
                ModuleDefinitionBuilder::<P>::from_parameters(&set).map_err(|err| match err {
                    ConfigError::Parameters(source) => ConfigError::ModuleBlock { index, source },
                    other => other,
                })?;
            if definitions.contains_key(definition.name()) {
                return Err(ConfigError::DuplicateModule(definition.name().to_owned()));
            }
            definitions.insert(definition.name().to_owned(), definition);
        }

        let missing: Vec<MissingPrerequisite> = definitions
            .values()
            .flat_map(|definition| {
                definition
                    .prerequisites_with_kind()
                    .filter(|(_, name)| !definitions.contains_key(*name))
                    .map(|(kind, name)| MissingPrerequisite {
                        module: definition.name().to_owned(),
                        prerequisite: name.to_owned(),
                        kind,
                    })
            })
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingPrerequisites(missing));
        }

        let order = sort(&definitions)?;
        debug!(modules = ?order, "module order resolved");
        let ordered = order
            .iter()
            .filter_map(|name| definitions.swap_remove(name))
            .collect();
        Configuration::new(ordered, execution)
    }
}

fn sort(definitions: &IndexMap<String, ModuleDefinition>) -> Result<Vec<String>> {
    let mut graph: Graph<String> = Graph::new();
    graph
        .add_nodes(definitions.keys().cloned())
        .map_err(ordering_error)?;
    for definition in definitions.values() {
        let from = definition.name().to_owned();
        for prerequisite in definition.prerequisites() {
            graph
                .add_edge(&from, &prerequisite.to_owned())
                .map_err(ordering_error)?;
        }
    }
    graph.topo_sort().map_err(|err| match err {
        GraphError::Cycle { node, path } => ConfigError::Cycle { module: node, path },
        other => ordering_error(other),
    })
}

fn ordering_error(err: GraphError<String>) -> ConfigError {
    ConfigError::Ordering(err.to_string())
}

fn owned(values: Vec<&str>) -> Vec<String> {
    values.into_iter().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::PrerequisiteKind;
    use modcon_params::ParameterError;

    fn build(raw: &str) -> Result<Configuration> {
        ConfigurationBuilder::default().build(raw)
    }

    #[test]
    fn definition_builder_reads_all_keys() {
        let definition = ModuleDefinitionBuilder::default()
            .build("name=web class=http.Server requirement=db predecessor=log requirement=cache configuration=[ port=8080 ]")
            .unwrap();
        assert_eq!(definition.name(), "web");
        assert_eq!(definition.implementation(), "http.Server");
        assert_eq!(definition.requirements(), ["db", "cache"]);
        assert_eq!(definition.predecessors(), ["log"]);
        assert_eq!(definition.configuration(), "port=8080");
    }

    #[test]
    fn definition_builder_rejects_unknown_and_missing_keys() {
        let builder = ModuleDefinitionBuilder::default();
        assert!(matches!(
            builder.build("name=a class=b colour=red"),
            Err(ConfigError::Parameters(ParameterError::UnknownKey { .. }))
        ));
        assert!(matches!(
            builder.build("name=a"),
            Err(ConfigError::Parameters(ParameterError::Missing(key))) if key == "class"
        ));
    }

    #[test]
    fn modules_are_ordered_after_their_prerequisites() {
        let config = build(
            "module=[ name=a class=x requirement=b ] \
             module=[ name=b class=x predecessor=c ] \
             module=[ name=c class=x ] \
             execution=[ a.run=1 ]",
        )
        .unwrap();
        assert_eq!(config.names().collect::<Vec<_>>(), vec!["c", "b", "a"]);
        assert_eq!(config.execution(), Some("a.run=1"));
    }

    #[test]
    fn quoted_prerequisites_match_module_names() {
        let config = build(
            r#"module=[ name=a class=x requirement=" b" predecessor="c " ] module=[ name=b class=x ] module=[ name=c class=x ]"#,
        )
        .unwrap();
        assert_eq!(config.names().collect::<Vec<_>>(), vec!["b", "c", "a"]);
    }

    #[test]
    fn empty_specification_builds_empty_configuration() {
        let config = build("").unwrap();
        assert!(config.is_empty());
        assert!(config.execution().is_none());
    }

    #[test]
    fn all_missing_prerequisites_are_reported_together() {
        let err = build(
            "module=[ name=a class=x requirement=ghost ] \
             module=[ name=b class=x predecessor=phantom requirement=a ]",
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingPrerequisites(vec![
                MissingPrerequisite {
                    module: "a".into(),
                    prerequisite: "ghost".into(),
                    kind: PrerequisiteKind::Requirement,
                },
                MissingPrerequisite {
                    module: "b".into(),
                    prerequisite: "phantom".into(),
                    kind: PrerequisiteKind::Predecessor,
                },
            ])
        );
    }

    #[test]
    fn duplicate_module_names_fail_fast() {
        let err = build("module=[name=a class=x] module=[name=a class=y]").unwrap_err();
        assert_eq!(err, ConfigError::DuplicateModule("a".into()));
    }

    #[test]
    fn cycles_surface_as_configuration_error() {
        let err = build(
            "module=[name=a class=x requirement=b] \
             module=[name=b class=x requirement=c] \
             module=[name=c class=x predecessor=a]",
        )
        .unwrap_err();
        let ConfigError::Cycle { module, path } = err else {
            panic!("expected cycle, got {err:?}");
        };
        assert!(["a", "b", "c"].contains(&module.as_str()));
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn self_reference_fails_before_ordering() {
        let err = build("module=[name=a class=x requirement=a]").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDefinition { ref module, .. } if module == "a"));
    }

    #[test]
    fn malformed_blocks_report_their_position() {
        let err = build("module=[name=a class=x] module=[name=b class]").unwrap_err();
        assert!(matches!(err, ConfigError::ModuleBlock { index: 1, .. }));
        assert!(matches!(
            build("modules=[name=a class=x]"),
            Err(ConfigError::Parameters(ParameterError::UnknownKey { .. }))
        ));
        assert!(matches!(
            build("execution=[] execution=[]"),
            Err(ConfigError::Parameters(ParameterError::Repeated { .. }))
        ));
    }
}
