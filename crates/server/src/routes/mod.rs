use actix_web::web;
use ragvec_common::{RagVecError, Result};

mod add;
#[path = "search.rs"]
mod search_routes;
mod system;

pub use add::{add_text, add_vector};
pub use search_routes::{search, search_vector};
pub use system::{get_record, health, stats};

/// Register every route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(add_text)
        .service(add_vector)
        .service(search)
        .service(search_vector)
        .service(get_record)
        .service(stats)
        .service(health);
}

/// Missing or blank `text` is a client error
pub(crate) fn require_text(text: Option<&str>) -> Result<&str> {
    match text {
        None => Err(RagVecError::invalid_argument("No text provided")),
        Some(t) if t.trim().is_empty() => Err(RagVecError::invalid_argument("Text cannot be empty")),
        Some(t) => Ok(t),
    }
}

/// Requested k, or the configured default when absent. Must be positive.
pub(crate) fn resolve_k(k: Option<i64>, default_k: usize) -> Result<usize> {
    match k {
        None => Ok(default_k),
        Some(k) if k <= 0 => Err(RagVecError::invalid_argument(format!(
            "k must be a positive integer, got {}",
            k
        ))),
        Some(k) => usize::try_from(k)
            .map_err(|_| RagVecError::invalid_argument(format!("k {} is too large", k))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text() {
        assert!(require_text(None).is_err());
        assert!(require_text(Some("  ")).is_err());
        assert_eq!(require_text(Some("hello")).unwrap(), "hello");
    }

    #[test]
    fn test_resolve_k() {
        assert_eq!(resolve_k(None, 5).unwrap(), 5);
        assert_eq!(resolve_k(Some(3), 5).unwrap(), 3);
        assert!(matches!(resolve_k(Some(0), 5), Err(RagVecError::InvalidArgument(_))));
        assert!(matches!(resolve_k(Some(-2), 5), Err(RagVecError::InvalidArgument(_))));
    }
}
