//! Static registry of the view types offered in the "Add View" menu.

use crate::view_type::ViewType;

const STABLE_RELEASE: &str = "Stable Release";

/// One catalog entry. Loaded once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewTypeDescriptor {
    pub view_type: ViewType,
    pub name: &'static str,
    pub category: &'static str,
    pub version: u32,
    pub dev_stage: &'static str,
}

impl ViewTypeDescriptor {
    pub fn type_tag(&self) -> &'static str {
        self.view_type.tag()
    }

    /// Menu text, annotated with a non-default dev stage and version.
    pub fn display_text(&self) -> String {
        let mut text = self.name.to_string();
        if !self.dev_stage.is_empty() && self.dev_stage != STABLE_RELEASE {
            text.push_str(&format!(" (** {} **)", self.dev_stage));
        }
        if self.version != 1 {
            text.push_str(&format!(" [v.{}]", self.version));
        }
        text
    }
}

static CATALOG: [ViewTypeDescriptor; 6] = [
    ViewTypeDescriptor {
        view_type: ViewType::Scatter,
        name: "Scatter",
        category: "Visualization",
        version: 1,
        dev_stage: STABLE_RELEASE,
    },
    ViewTypeDescriptor {
        view_type: ViewType::Scatter3D,
        name: "Scatter 3D",
        category: "Visualization",
        version: 1,
        dev_stage: "Beta",
    },
    ViewTypeDescriptor {
        view_type: ViewType::Regression,
        name: "Regression",
        category: "Analysis",
        version: 2,
        dev_stage: STABLE_RELEASE,
    },
    ViewTypeDescriptor {
        view_type: ViewType::PeriodicTable,
        name: "Periodic Table",
        category: "Visualization",
        version: 1,
        dev_stage: "",
    },
    ViewTypeDescriptor {
        view_type: ViewType::OneHot,
        name: "One-hot Encoding",
        category: "Data Preparation",
        version: 1,
        dev_stage: STABLE_RELEASE,
    },
    ViewTypeDescriptor {
        view_type: ViewType::Xenonpy,
        name: "XenonPy Descriptors",
        category: "Data Preparation",
        version: 1,
        dev_stage: "Alpha",
    },
];

/// The raw catalog in declaration order.
pub fn catalog() -> &'static [ViewTypeDescriptor] {
    &CATALOG
}

pub fn descriptor(view_type: ViewType) -> Option<&'static ViewTypeDescriptor> {
    CATALOG.iter().find(|d| d.view_type == view_type)
}

pub fn find_by_tag(tag: &str) -> Option<&'static ViewTypeDescriptor> {
    CATALOG.iter().find(|d| d.type_tag() == tag)
}

/// Views sharing a category, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewCategory {
    pub name: &'static str,
    pub views: Vec<&'static ViewTypeDescriptor>,
}

/// Catalog grouped by category; category order is first-seen order.
pub fn list_view_types() -> Vec<ViewCategory> {
    let mut groups: Vec<ViewCategory> = Vec::new();
    for desc in &CATALOG {
        match groups.iter_mut().find(|g| g.name == desc.category) {
            Some(group) => group.views.push(desc),
            None => groups.push(ViewCategory {
                name: desc.category,
                views: vec![desc],
            }),
        }
    }
    groups
}

/// Flattened selection menu: a disabled header per category, then its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOption {
    Header { category: &'static str },
    Entry { text: String, value: &'static str },
}

pub fn menu_options() -> Vec<MenuOption> {
    let mut options = Vec::new();
    for group in list_view_types() {
        if group.views.is_empty() {
            continue;
        }
        options.push(MenuOption::Header {
            category: group.name,
        });
        options.extend(group.views.iter().map(|d| MenuOption::Entry {
            text: d.display_text(),
            value: d.type_tag(),
        }));
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn type_tags_are_unique() {
        let tags: HashSet<_> = catalog().iter().map(|d| d.type_tag()).collect();
        assert_eq!(tags.len(), catalog().len());
    }

    #[test]
    fn every_view_type_is_listed() {
        for t in ViewType::ALL {
            assert!(descriptor(t).is_some(), "{t} missing from catalog");
        }
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let groups = list_view_types();
        let names: Vec<_> = groups.iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["Visualization", "Analysis", "Data Preparation"]);

        // Periodic Table comes after Regression in the catalog but groups with
        // the other visualizations.
        let vis: Vec<_> = groups[0].views.iter().map(|d| d.view_type).collect();
        assert_eq!(
            vis,
            vec![ViewType::Scatter, ViewType::Scatter3D, ViewType::PeriodicTable]
        );
    }

    #[test]
    fn display_text_annotations() {
        let scatter3d = descriptor(ViewType::Scatter3D).unwrap();
        assert_eq!(scatter3d.display_text(), "Scatter 3D (** Beta **)");

        let regression = descriptor(ViewType::Regression).unwrap();
        assert_eq!(regression.display_text(), "Regression [v.2]");

        let periodic = descriptor(ViewType::PeriodicTable).unwrap();
        assert_eq!(periodic.display_text(), "Periodic Table");
    }

    #[test]
    fn menu_has_one_header_per_category() {
        let options = menu_options();
        let headers = options
            .iter()
            .filter(|o| matches!(o, MenuOption::Header { .. }))
            .count();
        assert_eq!(headers, list_view_types().len());
        assert_eq!(options.len(), headers + catalog().len());
        assert_eq!(
            options[0],
            MenuOption::Header {
                category: "Visualization"
            }
        );
    }
}
