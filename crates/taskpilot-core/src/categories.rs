use taskpilot_shared::{CategoryKey, ScheduleResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryGroup<'a> {
    pub key: CategoryKey,
    pub entries: &'a [String],
}

impl CategoryGroup<'_> {
    pub fn label(&self) -> &'static str {
        self.key.label()
    }
}

/// Non-empty quadrants in display order, entries as returned by the service.
pub fn category_groups(result: &ScheduleResult) -> impl Iterator<Item = CategoryGroup<'_>> {
    CategoryKey::ALL.into_iter().filter_map(move |key| {
        let entries = result.entries(key);
        (!entries.is_empty()).then_some(CategoryGroup { key, entries })
    })
}
