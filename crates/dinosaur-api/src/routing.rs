//! Static route table with `:param` path patterns.
//!
//! Routes are kept in registration order and the first match wins. Register
//! more specific patterns (`/dinosaur/count`) before more general ones
//! (`/dinosaur/:id`) when extending the table, or the general pattern will
//! shadow them.

use axum::http::Method;

/// One segment of a path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Must equal the request segment exactly
    Literal(String),
    /// Binds the request segment under this name
    Param(String),
}

/// A parsed path pattern such as `/dinosaur/:id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse a pattern. Segments prefixed with `:` bind a named parameter;
    /// a bare `:` is treated as a literal.
    pub fn new(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                _ => Segment::Literal(segment.to_string()),
            })
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    /// The pattern as registered
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a request path, returning the bound parameters on success
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let mut params = PathParams::default();
        let mut request_segments = split_path(path);

        for segment in &self.segments {
            let value = request_segments.next()?;
            match segment {
                Segment::Literal(literal) if literal == value => {}
                Segment::Literal(_) => return None,
                Segment::Param(_) if value.is_empty() => return None,
                Segment::Param(name) => params.insert(name.clone(), value.to_string()),
            }
        }

        // Extra trailing segments mean a different resource
        if request_segments.next().is_some() {
            return None;
        }

        Some(params)
    }
}

/// Split a path into segments, ignoring one leading and one trailing slash.
///
/// Inner empty segments are kept, so `/dinosaur//1` has three segments.
fn split_path(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = if trimmed.is_empty() {
        trimmed
    } else {
        trimmed.strip_suffix('/').unwrap_or(trimmed)
    };
    // "/" and "" have no segments at all
    let root = path.is_empty() || path == "/";
    trimmed.split('/').filter(move |_| !root)
}

/// Path parameters bound during a match, in pattern order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: Vec<(String, String)>,
}

impl PathParams {
    fn insert(&mut self, name: String, value: String) {
        self.values.push((name, value));
    }

    /// Get a parameter by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Number of bound parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the pattern had no parameters
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A registered route
#[derive(Debug, Clone)]
pub struct Route<H> {
    method: Method,
    pattern: PathPattern,
    handler: H,
}

impl<H> Route<H> {
    /// HTTP method this route answers
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path pattern this route answers
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Whether the route accepts this request method. GET routes also answer HEAD.
    fn accepts(&self, method: &Method) -> bool {
        self.method == *method || (*method == Method::HEAD && self.method == Method::GET)
    }
}

/// Outcome of resolving a request against the table
#[derive(Debug, PartialEq, Eq)]
pub enum RouteMatch<'a, H> {
    /// A route accepted both method and path
    Matched {
        /// Handler of the first matching route
        handler: &'a H,
        /// Parameters bound from the path
        params: PathParams,
    },
    /// Some route matched the path, none matched the method
    MethodNotAllowed {
        /// Methods the path does accept, in registration order
        allowed: Vec<Method>,
    },
    /// No route matched the path
    NotFound,
}

/// Ordered table of `(method, pattern) -> handler`
#[derive(Debug, Clone)]
pub struct RouteTable<H> {
    routes: Vec<Route<H>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<H> RouteTable<H> {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route
    pub fn route(mut self, method: Method, pattern: &str, handler: H) -> Self {
        self.routes.push(Route {
            method,
            pattern: PathPattern::new(pattern),
            handler,
        });
        self
    }

    /// Append a GET route
    pub fn get(self, pattern: &str, handler: H) -> Self {
        self.route(Method::GET, pattern, handler)
    }

    /// Append a POST route
    pub fn post(self, pattern: &str, handler: H) -> Self {
        self.route(Method::POST, pattern, handler)
    }

    /// Append a DELETE route
    pub fn delete(self, pattern: &str, handler: H) -> Self {
        self.route(Method::DELETE, pattern, handler)
    }

    /// Registered routes in order
    pub fn routes(&self) -> &[Route<H>] {
        &self.routes
    }

    /// Resolve a request to the first route matching both method and path
    pub fn resolve(&self, method: &Method, path: &str) -> RouteMatch<'_, H> {
        let mut allowed: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(params) = route.pattern.matches(path) else {
                continue;
            };

            if route.accepts(method) {
                return RouteMatch::Matched {
                    handler: &route.handler,
                    params,
                };
            }

            if !allowed.contains(&route.method) {
                allowed.push(route.method.clone());
            }
        }

        if allowed.is_empty() {
            RouteMatch::NotFound
        } else {
            RouteMatch::MethodNotAllowed { allowed }
        }
    }
}

/// Render an `Allow` header value. GET implies HEAD, and OPTIONS is always answered.
pub fn allow_header_value(allowed: &[Method]) -> String {
    let mut methods: Vec<&str> = Vec::with_capacity(allowed.len() + 2);
    for method in allowed {
        methods.push(method.as_str());
        if *method == Method::GET && !allowed.contains(&Method::HEAD) {
            methods.push(Method::HEAD.as_str());
        }
    }
    if !allowed.contains(&Method::OPTIONS) {
        methods.push(Method::OPTIONS.as_str());
    }
    methods.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable<&'static str> {
        RouteTable::new()
            .get("/", "welcome")
            .get("/dinosaur", "list")
            .get("/dinosaur/:id", "get")
            .post("/dinosaur", "create")
            .delete("/dinosaur/:id", "delete")
    }

    #[test]
    fn test_pattern_binds_param() {
        let pattern = PathPattern::new("/dinosaur/:id");
        let params = pattern.matches("/dinosaur/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_pattern_rejects_other_shapes() {
        let pattern = PathPattern::new("/dinosaur/:id");
        assert!(pattern.matches("/dinosaur").is_none());
        assert!(pattern.matches("/dinosaur/42/bones").is_none());
        assert!(pattern.matches("/dinosaurs/42").is_none());
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let pattern = PathPattern::new("/dinosaur");
        assert!(pattern.matches("/dinosaur/").is_some());
        assert!(PathPattern::new("/dinosaur/:id")
            .matches("/dinosaur/7/")
            .is_some());
    }

    #[test]
    fn test_empty_segments_are_not_collapsed() {
        let pattern = PathPattern::new("/dinosaur/:id");
        assert!(pattern.matches("//dinosaur//1").is_none());
        assert!(pattern.matches("/dinosaur//1").is_none());
        assert!(pattern.matches("//dinosaur/1").is_none());
        assert!(pattern.matches("/dinosaur//").is_none());
        assert!(PathPattern::new("/dinosaur").matches("/dinosaur//").is_none());
        assert!(PathPattern::new("/").matches("//").is_none());
    }

    #[test]
    fn test_resolve_rejects_doubled_slashes() {
        let table = table();
        assert_eq!(table.resolve(&Method::GET, "//dinosaur//1"), RouteMatch::NotFound);
        assert_eq!(table.resolve(&Method::GET, "/dinosaur//1"), RouteMatch::NotFound);
        assert_eq!(table.resolve(&Method::DELETE, "/dinosaur//1"), RouteMatch::NotFound);
    }

    #[test]
    fn test_root_pattern() {
        let pattern = PathPattern::new("/");
        let params = pattern.matches("/").unwrap();
        assert!(params.is_empty());
        assert!(pattern.matches("/dinosaur").is_none());
    }

    #[test]
    fn test_bare_colon_is_literal() {
        let pattern = PathPattern::new("/:");
        assert!(pattern.matches("/:").is_some());
        assert!(pattern.matches("/x").is_none());
    }

    #[test]
    fn test_resolve_matches_method_and_path() {
        let table = table();

        match table.resolve(&Method::GET, "/dinosaur/42") {
            RouteMatch::Matched { handler, params } => {
                assert_eq!(*handler, "get");
                assert_eq!(params.get("id"), Some("42"));
            }
            other => panic!("unexpected match: {:?}", other),
        }

        match table.resolve(&Method::DELETE, "/dinosaur/42") {
            RouteMatch::Matched { handler, .. } => assert_eq!(*handler, "delete"),
            other => panic!("unexpected match: {:?}", other),
        }

        match table.resolve(&Method::POST, "/dinosaur") {
            RouteMatch::Matched { handler, .. } => assert_eq!(*handler, "create"),
            other => panic!("unexpected match: {:?}", other),
        }
    }

    #[test]
    fn test_first_match_wins() {
        let table = RouteTable::new()
            .get("/dinosaur/count", "count")
            .get("/dinosaur/:id", "get");

        match table.resolve(&Method::GET, "/dinosaur/count") {
            RouteMatch::Matched { handler, params } => {
                assert_eq!(*handler, "count");
                assert!(params.is_empty());
            }
            other => panic!("unexpected match: {:?}", other),
        }
    }

    #[test]
    fn test_head_uses_get_route() {
        match table().resolve(&Method::HEAD, "/dinosaur") {
            RouteMatch::Matched { handler, .. } => assert_eq!(*handler, "list"),
            other => panic!("unexpected match: {:?}", other),
        }
    }

    #[test]
    fn test_method_not_allowed_lists_methods() {
        let table = table();
        assert_eq!(
            table.resolve(&Method::PUT, "/dinosaur/1"),
            RouteMatch::MethodNotAllowed {
                allowed: vec![Method::GET, Method::DELETE]
            }
        );
        assert_eq!(
            table.resolve(&Method::PATCH, "/dinosaur"),
            RouteMatch::MethodNotAllowed {
                allowed: vec![Method::GET, Method::POST]
            }
        );
    }

    #[test]
    fn test_unknown_path_not_found() {
        assert_eq!(
            table().resolve(&Method::GET, "/fossil"),
            RouteMatch::NotFound
        );
    }

    #[test]
    fn test_allow_header_value() {
        assert_eq!(
            allow_header_value(&[Method::GET, Method::DELETE]),
            "GET, HEAD, DELETE, OPTIONS"
        );
        assert_eq!(allow_header_value(&[Method::POST]), "POST, OPTIONS");
    }
}
