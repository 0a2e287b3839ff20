macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

/// Versioned API route definitions shared by the server and its clients
pub mod v1 {
    pub const ROOT: &str = "/api/v1";
    pub const VERSION: &str = "v1";
    pub const HEALTH: &str = v1_path!("/health");

    pub mod subjects {
        pub const COLLECTION: &str = v1_path!("/subjects");
    }

    pub mod courses {
        pub const COLLECTION: &str = v1_path!("/courses");
        pub const MINE: &str = v1_path!("/courses/mine");
        pub const ENROLLED: &str = v1_path!("/courses/enrolled");
        pub const ITEM: &str = v1_path!("/courses/{id}");
        pub const ENROLL: &str = v1_path!("/courses/{id}/enroll");
        pub const CONTENTS: &str = v1_path!("/courses/{id}/contents");
        pub const MODULES: &str = v1_path!("/courses/{id}/modules");
        pub const STUDY: &str = v1_path!("/courses/{id}/study");
        pub const STUDY_MODULE: &str =
            v1_path!("/courses/{id}/study/{module_id}");
    }

    pub mod modules {
        pub const ITEM: &str = v1_path!("/modules/{id}");
        pub const ORDER: &str = v1_path!("/modules/order");
        pub const CONTENTS: &str = v1_path!("/modules/{id}/contents");
        pub const CREATE_CONTENT: &str =
            v1_path!("/modules/{id}/content/{kind}");
    }

    pub mod content {
        pub const ITEM: &str = v1_path!("/content/{id}");
        pub const ORDER: &str = v1_path!("/content/order");
    }
}

/// Helper utilities for working with route templates
pub mod utils {
    /// Replace a single path parameter (e.g. `"{id}"`) with the provided value.
    pub fn replace_param(
        route: &str,
        param: &str,
        value: impl AsRef<str>,
    ) -> String {
        route.replace(param, value.as_ref())
    }

    /// Replace multiple path parameters in order.
    pub fn replace_params(
        route: &str,
        params: &[(&str, &str)],
    ) -> String {
        let mut path = route.to_string();
        for (param, value) in params {
            path = path.replace(param, value);
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_share_the_version_root() {
        assert!(v1::courses::MODULES.starts_with(v1::ROOT));
        assert_eq!(
            utils::replace_params(
                v1::modules::CREATE_CONTENT,
                &[("{id}", "abc"), ("{kind}", "video")]
            ),
            "/api/v1/modules/abc/content/video"
        );
    }
}
