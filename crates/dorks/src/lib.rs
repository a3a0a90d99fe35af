pub mod source;
pub mod template;

pub use source::{resolve_dorks, DorkSet, DorkSource};
pub use template::{apply_domain, build_plan, QueryPlan};

/// Marker replaced by the target domain.
pub const DOMAIN_PLACEHOLDER: &str = "{domain}";

// Swagger UI / OpenAPI discovery templates
pub const BUILTIN_DORKS: &[&str] = &[
    r#"inurl:"/swagger-ui/index.html""#,
    r#"intitle:"Swagger UI" (inurl:"/swagger-ui/" OR inurl:"/swagger/" OR inurl:"/api-docs/" OR inurl:"/v2/api-docs")"#,
    "site:*.{domain} -www",
    r#"intext:"Swagger UI" intitle:"Swagger UI" site:{domain}"#,
    "site:{domain} inurl:(swagger.json OR swagger.yaml)",
    "(inurl:api OR inurl:apis OR inurl:graphql OR inurl:swagger OR inurl:v1 OR inurl:v2) (filetype:json OR filetype:yaml) site:{domain}",
];
