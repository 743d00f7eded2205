//! Strategy registry.
//!
//! Built once from an explicit list of strategies and read-only afterwards,
//! so concurrent lookups need no locking. Wrap it in an `Arc` to share it.

use crate::core::document_type::DocumentType;
use crate::plugins::strategy::{ProcessingStrategy, StrategyInfo};
use crate::{DocprocError, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Validate a plugin name before registration.
fn validate_plugin_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DocprocError::Validation {
            message: "Plugin name cannot be empty".to_string(),
            source: None,
        });
    }

    if name.contains(char::is_whitespace) {
        return Err(DocprocError::Validation {
            message: format!("Plugin name '{}' cannot contain whitespace", name),
            source: None,
        });
    }

    Ok(())
}

/// Type and name indexes over a fixed set of strategies.
///
/// # Selection
///
/// - Per type, the strategy with the numerically smallest priority wins.
///   On equal priority the first registered one is kept.
/// - Per name, a collision keeps the entry with the smaller or equal
///   priority and logs a warning. There is never more than one live entry
///   per name.
///
/// # Example
///
/// ```rust
/// use docproc::plugins::registry::StrategyRegistry;
/// use docproc::strategies::default_strategies;
/// use docproc::core::document_type::DocumentType;
///
/// let registry = StrategyRegistry::new(default_strategies()).unwrap();
/// let csv = registry.resolve_by_type(DocumentType::Csv).unwrap();
/// assert_eq!(csv.name(), "CSV_PROCESSING_STRATEGY");
/// ```
pub struct StrategyRegistry {
    by_type: BTreeMap<DocumentType, Arc<dyn ProcessingStrategy>>,
    by_name: HashMap<String, Arc<dyn ProcessingStrategy>>,
    registration_order: Vec<String>,
}

impl StrategyRegistry {
    /// Build a registry that must cover every [`DocumentType`].
    ///
    /// # Errors
    ///
    /// - `DocprocError::Validation` for an empty or whitespace-bearing name
    /// - whatever a strategy's `initialize` returns
    /// - `DocprocError::Plugin` if some type has no strategy
    pub fn new(strategies: Vec<Arc<dyn ProcessingStrategy>>) -> Result<Self> {
        let registry = Self::with_strategies(strategies)?;

        let missing: Vec<&str> = DocumentType::all()
            .iter()
            .filter(|t| !registry.by_type.contains_key(t))
            .map(|t| t.type_name())
            .collect();

        if !missing.is_empty() {
            return Err(DocprocError::Plugin {
                message: format!("No strategy registered for document type(s): {}", missing.join(", ")),
                plugin_name: "strategy-registry".to_string(),
            });
        }

        Ok(registry)
    }

    /// Build a registry without requiring full type coverage.
    pub fn with_strategies(strategies: Vec<Arc<dyn ProcessingStrategy>>) -> Result<Self> {
        let mut by_type: BTreeMap<DocumentType, Arc<dyn ProcessingStrategy>> = BTreeMap::new();
        let mut by_name: HashMap<String, Arc<dyn ProcessingStrategy>> = HashMap::new();
        let mut registration_order = Vec::new();

        for strategy in strategies {
            let name = strategy.name().to_string();
            let priority = strategy.priority();
            let supported_type = strategy.supported_type();

            validate_plugin_name(&name)?;
            strategy.initialize()?;

            match by_type.get(&supported_type) {
                Some(current) if current.priority() <= priority => {}
                _ => {
                    by_type.insert(supported_type, Arc::clone(&strategy));
                }
            }

            match by_name.get(&name) {
                Some(current) => {
                    let current_priority = current.priority();
                    tracing::warn!(
                        strategy = %name,
                        kept_priority = current_priority.min(priority),
                        dropped_priority = current_priority.max(priority),
                        "Duplicate strategy name, keeping the lower priority number"
                    );
                    if priority < current_priority {
                        by_name.insert(name, strategy);
                    }
                }
                None => {
                    registration_order.push(name.clone());
                    by_name.insert(name, strategy);
                }
            }
        }

        for (document_type, strategy) in &by_type {
            tracing::info!(
                document_type = %document_type,
                strategy = strategy.name(),
                priority = strategy.priority(),
                "Registered processing strategy"
            );
        }

        Ok(Self {
            by_type,
            by_name,
            registration_order,
        })
    }

    /// The winning strategy for a type.
    ///
    /// # Errors
    ///
    /// `DocprocError::StrategyNotFound` if no strategy handles the type.
    pub fn resolve_by_type(&self, document_type: DocumentType) -> Result<Arc<dyn ProcessingStrategy>> {
        self.by_type
            .get(&document_type)
            .cloned()
            .ok_or_else(|| DocprocError::StrategyNotFound {
                requested: document_type.type_name().to_string(),
                available: self.names(),
            })
    }

    /// Exact, case-sensitive name lookup.
    pub fn resolve_by_name(&self, name: &str) -> Result<Arc<dyn ProcessingStrategy>> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| DocprocError::StrategyNotFound {
                requested: name.to_string(),
                available: self.names(),
            })
    }

    /// Every live strategy, sorted ascending by priority.
    pub fn list_all(&self) -> Vec<StrategyInfo> {
        let mut infos: Vec<StrategyInfo> = self
            .all_strategies()
            .iter()
            .map(|s| StrategyInfo::of(s.as_ref()))
            .collect();
        infos.sort_by_key(|info| info.priority);
        infos
    }

    /// Every live strategy in registration order.
    pub fn all_strategies(&self) -> Vec<Arc<dyn ProcessingStrategy>> {
        self.registration_order
            .iter()
            .filter_map(|name| self.by_name.get(name).cloned())
            .collect()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn supported_types(&self) -> Vec<DocumentType> {
        self.by_type.keys().copied().collect()
    }

    pub fn is_type_supported(&self, document_type: DocumentType) -> bool {
        self.by_type.contains_key(&document_type)
    }

    /// Winning strategy name per type.
    pub fn type_assignments(&self) -> BTreeMap<DocumentType, String> {
        self.by_type
            .iter()
            .map(|(t, s)| (*t, s.name().to_string()))
            .collect()
    }

    /// Call `shutdown` on every live strategy.
    pub fn shutdown_all(&self) -> Result<()> {
        for strategy in self.all_strategies() {
            strategy.shutdown()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("types", &self.type_assignments())
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ProcessorConfig;
    use crate::plugins::Plugin;
    use crate::types::{Document, ProcessingResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockStrategy {
        name: &'static str,
        supported: DocumentType,
        priority: i32,
        shutdowns: AtomicUsize,
    }

    impl MockStrategy {
        fn arc(name: &'static str, supported: DocumentType, priority: i32) -> Arc<Self> {
            Arc::new(Self {
                name,
                supported,
                priority,
                shutdowns: AtomicUsize::new(0),
            })
        }
    }

    impl Plugin for MockStrategy {
        fn name(&self) -> &str {
            self.name
        }
        fn version(&self) -> String {
            "1.0.0".to_string()
        }
        fn initialize(&self) -> Result<()> {
            Ok(())
        }
        fn shutdown(&self) -> Result<()> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl ProcessingStrategy for MockStrategy {
        fn supported_type(&self) -> DocumentType {
            self.supported
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        fn process(&self, document: &Document, _config: &ProcessorConfig) -> Result<ProcessingResult> {
            Ok(ProcessingResult::success(&document.name, self.name, "mock"))
        }
    }

    fn full_set() -> Vec<Arc<dyn ProcessingStrategy>> {
        vec![
            MockStrategy::arc("CSV", DocumentType::Csv, 10),
            MockStrategy::arc("EXCEL", DocumentType::Excel, 15),
            MockStrategy::arc("PDF", DocumentType::Pdf, 20),
            MockStrategy::arc("WORD", DocumentType::Word, 25),
        ]
    }

    #[test]
    fn test_lowest_priority_number_wins_per_type() {
        let mut strategies = full_set();
        strategies.push(MockStrategy::arc("PDF_FAST", DocumentType::Pdf, 5));
        strategies.push(MockStrategy::arc("PDF_SLOW", DocumentType::Pdf, 15));

        let registry = StrategyRegistry::new(strategies).unwrap();
        assert_eq!(registry.resolve_by_type(DocumentType::Pdf).unwrap().name(), "PDF_FAST");
    }

    #[test]
    fn test_equal_priority_first_seen_wins() {
        let strategies: Vec<Arc<dyn ProcessingStrategy>> = vec![
            MockStrategy::arc("FIRST", DocumentType::Csv, 10),
            MockStrategy::arc("SECOND", DocumentType::Csv, 10),
        ];
        let registry = StrategyRegistry::with_strategies(strategies).unwrap();
        assert_eq!(registry.resolve_by_type(DocumentType::Csv).unwrap().name(), "FIRST");
    }

    #[test]
    fn test_name_collision_keeps_lower_priority() {
        let strategies: Vec<Arc<dyn ProcessingStrategy>> = vec![
            MockStrategy::arc("DUP", DocumentType::Csv, 20),
            MockStrategy::arc("DUP", DocumentType::Pdf, 10),
        ];
        let registry = StrategyRegistry::with_strategies(strategies).unwrap();

        let resolved = registry.resolve_by_name("DUP").unwrap();
        assert_eq!(resolved.priority(), 10);
        assert_eq!(registry.names(), vec!["DUP"]);
        assert_eq!(registry.all_strategies().len(), 1);
    }

    #[test]
    fn test_name_collision_equal_priority_keeps_first() {
        let strategies: Vec<Arc<dyn ProcessingStrategy>> = vec![
            MockStrategy::arc("DUP", DocumentType::Csv, 10),
            MockStrategy::arc("DUP", DocumentType::Pdf, 10),
        ];
        let registry = StrategyRegistry::with_strategies(strategies).unwrap();
        assert_eq!(
            registry.resolve_by_name("DUP").unwrap().supported_type(),
            DocumentType::Csv
        );
    }

    #[test]
    fn test_missing_type_fails_at_build() {
        let strategies: Vec<Arc<dyn ProcessingStrategy>> = vec![MockStrategy::arc("CSV", DocumentType::Csv, 10)];
        let err = StrategyRegistry::new(strategies).unwrap_err();
        match err {
            DocprocError::Plugin { message, .. } => {
                assert!(message.contains("PDF"));
                assert!(message.contains("EXCEL"));
                assert!(message.contains("WORD"));
                assert!(!message.contains("CSV"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_unknown_lists_names() {
        let registry = StrategyRegistry::new(full_set()).unwrap();
        match registry.resolve_by_name("NOPE") {
            Err(DocprocError::StrategyNotFound { requested, available }) => {
                assert_eq!(requested, "NOPE");
                assert_eq!(available, vec!["CSV", "EXCEL", "PDF", "WORD"]);
            }
            other => panic!("unexpected: {:?}", other.map(|s| s.name().to_string())),
        }

        let partial =
            StrategyRegistry::with_strategies(vec![MockStrategy::arc("CSV", DocumentType::Csv, 10)]).unwrap();
        assert!(matches!(
            partial.resolve_by_type(DocumentType::Word),
            Err(DocprocError::StrategyNotFound { .. })
        ));
    }

    #[test]
    fn test_list_all_sorted_by_priority() {
        let strategies: Vec<Arc<dyn ProcessingStrategy>> = vec![
            MockStrategy::arc("WORD", DocumentType::Word, 25),
            MockStrategy::arc("CSV", DocumentType::Csv, 10),
            MockStrategy::arc("PDF", DocumentType::Pdf, 20),
            MockStrategy::arc("EXCEL", DocumentType::Excel, 15),
        ];
        let registry = StrategyRegistry::new(strategies).unwrap();
        let listed: Vec<i32> = registry.list_all().iter().map(|i| i.priority).collect();
        assert_eq!(listed, vec![10, 15, 20, 25]);
        assert_eq!(registry.list_all()[1].supported_extensions, vec!["xlsx", "xls"]);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let empty: Vec<Arc<dyn ProcessingStrategy>> = vec![MockStrategy::arc("", DocumentType::Csv, 10)];
        assert!(matches!(
            StrategyRegistry::with_strategies(empty),
            Err(DocprocError::Validation { .. })
        ));

        let spaced: Vec<Arc<dyn ProcessingStrategy>> = vec![MockStrategy::arc("MY CSV", DocumentType::Csv, 10)];
        assert!(matches!(
            StrategyRegistry::with_strategies(spaced),
            Err(DocprocError::Validation { .. })
        ));
    }

    #[test]
    fn test_shutdown_all() {
        let csv = MockStrategy::arc("CSV", DocumentType::Csv, 10);
        let registry = StrategyRegistry::with_strategies(vec![csv.clone() as Arc<dyn ProcessingStrategy>]).unwrap();
        registry.shutdown_all().unwrap();
        assert_eq!(csv.shutdowns.load(Ordering::SeqCst), 1);
        assert!(registry.is_type_supported(DocumentType::Csv));
        assert!(!registry.is_type_supported(DocumentType::Pdf));
        assert_eq!(registry.supported_types(), vec![DocumentType::Csv]);
    }
}
