use super::ModelDescriptor;

/// Tie-break policy over the capable models exposed by the provider.
/// Kept behind a trait so the policy can change without touching the
/// generation call sites.
pub trait ModelSelector: Send + Sync {
    /// Picks a model from the full provider listing. `None` means no
    /// capable model exists.
    fn select<'a>(&self, models: &'a [ModelDescriptor]) -> Option<&'a ModelDescriptor>;
}

/// Prefers the first capable model whose id contains the tier keyword
/// (the provider names its faster/cheaper tier "flash"), falling back to
/// the first capable model in listing order.
pub struct TierPreference {
    keyword: String,
}

impl TierPreference {
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
        }
    }
}

impl ModelSelector for TierPreference {
    fn select<'a>(&self, models: &'a [ModelDescriptor]) -> Option<&'a ModelDescriptor> {
        let capable: Vec<&ModelDescriptor> = models.iter().filter(|m| m.capable).collect();
        capable
            .iter()
            .find(|m| m.id.contains(&self.keyword))
            .or_else(|| capable.first())
            .copied()
    }
}
