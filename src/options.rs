//! Decode options.

/// Default limit on datatype nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Settings controlling how datatype messages are decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    strict: bool,
    max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { strict: false, max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl DecodeOptions {
    /// Returns a builder for configuring decode options.
    pub fn build() -> DecodeOptionsBuilder {
        DecodeOptionsBuilder::new()
    }

    /// Strict decoding never upgrades a decoded tree; content that would need a newer
    /// version than stored fails instead.
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Deepest nesting level accepted; the root is at level 0.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Builder used to create decode options.
#[derive(Clone, Debug, Default)]
pub struct DecodeOptionsBuilder {
    strict: Option<bool>,
    max_depth: Option<usize>,
}

impl DecodeOptionsBuilder {
    /// Creates a new decode options builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new builder from existing options.
    pub fn from_options(options: &DecodeOptions) -> Self {
        let mut builder = Self::default();
        builder.strict(options.strict()).max_depth(options.max_depth());
        builder
    }

    /// Sets whether to forbid in-place version upgrades while decoding.
    pub fn strict(&mut self, strict: bool) -> &mut Self {
        self.strict = Some(strict);
        self
    }

    /// Sets the maximum nesting depth.
    pub fn max_depth(&mut self, depth: usize) -> &mut Self {
        self.max_depth = Some(depth);
        self
    }

    /// Constructs the decode options.
    pub fn finish(&self) -> DecodeOptions {
        let mut options = DecodeOptions::default();
        if let Some(strict) = self.strict {
            options.strict = strict;
        }
        if let Some(depth) = self.max_depth {
            options.max_depth = depth;
        }
        options
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    pub fn test_defaults() {
        let options = DecodeOptions::default();
        assert!(!options.strict());
        assert_eq!(options.max_depth(), DEFAULT_MAX_DEPTH);
        assert_eq!(DecodeOptions::build().finish(), options);
    }

    #[test]
    pub fn test_builder() {
        let options = DecodeOptions::build().strict(true).max_depth(3).finish();
        assert!(options.strict());
        assert_eq!(options.max_depth(), 3);
        let copy = DecodeOptionsBuilder::from_options(&options).max_depth(7).finish();
        assert!(copy.strict());
        assert_eq!(copy.max_depth(), 7);
    }
}
