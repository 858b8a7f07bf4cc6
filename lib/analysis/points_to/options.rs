use std::default;

/// How pointers to aggregates are merged where control flow joins.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AggregatePolicy {
    /// Treat an aggregate pointer as a single indirection cell, and merge at
    /// the end of its chain of singleton aggregate pointees.
    #[default]
    ResolveChains,
    /// Merge aggregate pointers by plain union, like scalar pointers.
    MergedSlot,
}

/// Various options that can be passed to the points-to analysis.
#[derive(Clone, Debug)]
pub struct Options {
    allocators: Vec<String>,
    aggregate_policy: AggregatePolicy,
    max_call_depth: Option<usize>,
}

impl Options {
    /// Create a new set of Options with the default settings.
    pub fn new() -> Options {
        Options::default()
    }

    /// Returns true if calls to the function `name` allocate memory, and are
    /// not followed by the analysis.
    pub fn is_allocator(&self, name: &str) -> bool {
        self.allocators.iter().any(|allocator| allocator == name)
    }

    pub fn allocators(&self) -> &[String] {
        &self.allocators
    }

    /// Add a function to the list of recognized allocators.
    pub fn add_allocator<S: Into<String>>(&mut self, name: S) {
        let name = name.into();
        if !self.is_allocator(&name) {
            self.allocators.push(name);
        }
    }

    pub fn clear_allocators(&mut self) {
        self.allocators.clear();
    }

    pub fn aggregate_policy(&self) -> AggregatePolicy {
        self.aggregate_policy
    }

    pub fn set_aggregate_policy(&mut self, aggregate_policy: AggregatePolicy) {
        self.aggregate_policy = aggregate_policy;
    }

    /// The maximum number of nested calls followed from the entry function.
    ///
    /// `None`, the default, follows calls until recursion is detected.
    pub fn max_call_depth(&self) -> Option<usize> {
        self.max_call_depth
    }

    pub fn set_max_call_depth(&mut self, max_call_depth: Option<usize>) {
        self.max_call_depth = max_call_depth;
    }
}

impl default::Default for Options {
    fn default() -> Options {
        Options {
            allocators: vec![
                "malloc".to_string(),
                "calloc".to_string(),
                "realloc".to_string(),
            ],
            aggregate_policy: AggregatePolicy::default(),
            max_call_depth: None,
        }
    }
}

/// Create your options with the builder pattern.
///
/// For more details on the options, see `points_to::Options`
pub struct OptionsBuilder {
    options: Options,
}

impl OptionsBuilder {
    /// Create a new builder for points-to options.
    pub fn new() -> OptionsBuilder {
        OptionsBuilder {
            options: Options::default(),
        }
    }

    pub fn allocator<S: Into<String>>(mut self, name: S) -> OptionsBuilder {
        self.options.add_allocator(name);
        self
    }

    /// Forget the default allocators.
    pub fn no_allocators(mut self) -> OptionsBuilder {
        self.options.clear_allocators();
        self
    }

    /// Set the aggregate policy. By default this is
    /// `AggregatePolicy::ResolveChains`.
    pub fn aggregate_policy(mut self, aggregate_policy: AggregatePolicy) -> OptionsBuilder {
        self.options.set_aggregate_policy(aggregate_policy);
        self
    }

    pub fn max_call_depth(mut self, max_call_depth: usize) -> OptionsBuilder {
        self.options.set_max_call_depth(Some(max_call_depth));
        self
    }

    pub fn build(self) -> Options {
        self.options
    }
}

impl default::Default for OptionsBuilder {
    fn default() -> OptionsBuilder {
        OptionsBuilder::new()
    }
}
