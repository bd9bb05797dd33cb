// Block render map: which HTML elements render (and parse back as) which
// block types.

/// Element configuration for one block type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRenderConfig {
    /// Primary HTML tag, lowercase.
    pub element: String,
    /// Additional tags that parse into the same block type.
    pub aliased_elements: Vec<String>,
}

impl BlockRenderConfig {
    pub fn new(element: &str) -> Self {
        Self {
            element: element.to_string(),
            aliased_elements: Vec::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliased_elements = aliases.iter().map(|a| a.to_string()).collect();
        self
    }
}

/// Ordered mapping from block type to its element configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRenderMap {
    entries: Vec<(String, BlockRenderConfig)>,
}

impl BlockRenderMap {
    /// An empty render map.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add or replace the configuration for `block_type`.
    pub fn with(mut self, block_type: &str, config: BlockRenderConfig) -> Self {
        match self.entries.iter_mut().find(|(t, _)| t == block_type) {
            Some((_, existing)) => *existing = config,
            None => self.entries.push((block_type.to_string(), config)),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BlockRenderConfig)> {
        self.entries.iter().map(|(t, c)| (t.as_str(), c))
    }
}

impl Default for BlockRenderMap {
    fn default() -> Self {
        Self::empty()
            .with("header-one", BlockRenderConfig::new("h1"))
            .with("header-two", BlockRenderConfig::new("h2"))
            .with("header-three", BlockRenderConfig::new("h3"))
            .with("header-four", BlockRenderConfig::new("h4"))
            .with("header-five", BlockRenderConfig::new("h5"))
            .with("header-six", BlockRenderConfig::new("h6"))
            .with("section", BlockRenderConfig::new("section"))
            .with("article", BlockRenderConfig::new("article"))
            .with("unordered-list-item", BlockRenderConfig::new("li"))
            .with("ordered-list-item", BlockRenderConfig::new("li"))
            .with("blockquote", BlockRenderConfig::new("blockquote"))
            .with("atomic", BlockRenderConfig::new("figure"))
            .with("code-block", BlockRenderConfig::new("pre"))
            .with("unstyled", BlockRenderConfig::new("div").with_aliases(&["p"]))
    }
}
