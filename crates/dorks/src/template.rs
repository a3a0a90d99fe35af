use std::collections::HashSet;

use crate::DOMAIN_PLACEHOLDER;

/// Resolved, deduplicated queries for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPlan {
    pub target: Option<String>,
    pub queries: Vec<String>,
}

impl QueryPlan {
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Label used in the output file's target line.
    pub fn target_label(&self) -> &str {
        self.target.as_deref().unwrap_or("All Websites")
    }
}

/// Fill one template in for `domain`. `None` when the template needs a domain
/// and there isn't one.
pub fn apply_domain(template: &str, domain: Option<&str>) -> Option<String> {
    let needs_domain = template.contains(DOMAIN_PLACEHOLDER);
    match (needs_domain, domain) {
        (true, Some(d)) => Some(template.replace(DOMAIN_PLACEHOLDER, d)),
        (true, None) => None,
        (false, Some(d)) => Some(format!("{} site:{}", template, d)),
        (false, None) => Some(template.to_string()),
    }
}

/// Apply the domain to every template, first occurrence of a query wins.
pub fn build_plan<S: AsRef<str>>(templates: &[S], domain: &str) -> QueryPlan {
    let target = Some(domain.trim())
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    let mut seen = HashSet::new();
    let queries = templates
        .iter()
        .filter_map(|t| apply_domain(t.as_ref(), target.as_deref()))
        .filter(|q| seen.insert(q.clone()))
        .collect();

    QueryPlan { target, queries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BUILTIN_DORKS;

    #[test]
    fn test_apply_domain_cases() {
        assert_eq!(
            apply_domain("site:{domain} inurl:swagger", Some("example.com")).as_deref(),
            Some("site:example.com inurl:swagger")
        );
        assert_eq!(apply_domain("site:*.{domain} -www", None), None);
        assert_eq!(
            apply_domain("inurl:api-docs", Some("example.com")).as_deref(),
            Some("inurl:api-docs site:example.com")
        );
        assert_eq!(apply_domain("inurl:api-docs", None).as_deref(), Some("inurl:api-docs"));
    }

    #[test]
    fn test_builtin_plan_for_domain() {
        let plan = build_plan(BUILTIN_DORKS, "example.com");
        assert_eq!(plan.target_label(), "example.com");
        assert_eq!(plan.len(), 6);
        assert_eq!(plan.queries[0], "inurl:\"/swagger-ui/index.html\" site:example.com");
        assert_eq!(plan.queries[2], "site:*.example.com -www");
        assert!(plan.queries.iter().all(|q| q.contains("example.com")));
        assert!(plan.queries.iter().all(|q| !q.contains("{domain}")));
    }

    #[test]
    fn test_builtin_plan_without_domain_drops_placeholders() {
        let plan = build_plan(BUILTIN_DORKS, "   ");
        assert_eq!(plan.target, None);
        assert_eq!(plan.target_label(), "All Websites");
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.queries[0], BUILTIN_DORKS[0]);
        assert_eq!(plan.queries[1], BUILTIN_DORKS[1]);
    }

    #[test]
    fn test_plan_is_empty_when_every_template_needs_domain() {
        let plan = build_plan(&["site:{domain}", "site:*.{domain}"], "");
        assert!(plan.is_empty());
    }

    #[test]
    fn test_dedup_after_substitution_keeps_first_seen_order() {
        let templates = [
            "inurl:swagger",
            "site:{domain} inurl:openapi",
            "inurl:swagger site:{domain}",
            "inurl:openapi site:{domain}",
            "site:{domain} inurl:openapi",
        ];
        let plan = build_plan(&templates, "acme.io");
        assert_eq!(
            plan.queries,
            vec![
                "inurl:swagger site:acme.io",
                "site:acme.io inurl:openapi",
                "inurl:openapi site:acme.io",
            ]
        );
    }

    #[test]
    fn test_plan_never_contains_duplicates() {
        let templates = ["a", "b", "a", "{domain}", "c", "b", "x {domain}", "x {domain}"];
        for domain in ["", "d.com", "e.org"] {
            let plan = build_plan(&templates, domain);
            let unique: HashSet<_> = plan.queries.iter().collect();
            assert_eq!(unique.len(), plan.queries.len(), "domain {:?}", domain);
        }
    }
}
