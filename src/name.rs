//! Well-known directive names. Any other name is accepted verbatim by `Policy`.

// csp v1
pub const DEFAULT_SRC: &str = "default-src";
pub const CONNECT_SRC: &str = "connect-src";
pub const FONT_SRC: &str = "font-src";
pub const FRAME_SRC: &str = "frame-src";
pub const IMG_SRC: &str = "img-src";
pub const MEDIA_SRC: &str = "media-src";
pub const OBJECT_SRC: &str = "object-src";
pub const SANDBOX: &str = "sandbox";
pub const SCRIPT_SRC: &str = "script-src";
pub const STYLE_SRC: &str = "style-src";

// csp v2
pub const BASE_URI: &str = "base-uri";
pub const CHILD_SRC: &str = "child-src";
pub const FRAME_ANCESTORS: &str = "frame-ancestors";
pub const PLUGIN_TYPES: &str = "plugin-types";
pub const FORM_ACTION: &str = "form-action";

// csp v3
pub const TRUSTED_TYPES: &str = "trusted-types";
pub const REQUIRE_TRUSTED_TYPES_FOR: &str = "require-trusted-types-for";
pub const STYLE_SRC_ATTR: &str = "style-src-attr";
pub const STYLE_SRC_ELEM: &str = "style-src-elem";
pub const SCRIPT_SRC_ATTR: &str = "script-src-attr";
pub const SCRIPT_SRC_ELEM: &str = "script-src-elem";
pub const WORKER_SRC: &str = "worker-src";
pub const NAVIGATE_TO: &str = "navigate-to";
pub const PREFETCH_SRC: &str = "prefetch-src";
pub const MANIFEST_SRC: &str = "manifest-src";
pub const REPORT_TO: &str = "report-to";

// policy-wide, not stored as directives
pub const UPGRADE_INSECURE_REQUESTS: &str = "upgrade-insecure-requests";
pub const REPORT_URI: &str = "report-uri";

pub const WELL_KNOWN: &[&str] = &[
    DEFAULT_SRC,
    CONNECT_SRC,
    FONT_SRC,
    FRAME_SRC,
    IMG_SRC,
    MEDIA_SRC,
    OBJECT_SRC,
    SANDBOX,
    SCRIPT_SRC,
    STYLE_SRC,
    BASE_URI,
    CHILD_SRC,
    FRAME_ANCESTORS,
    PLUGIN_TYPES,
    FORM_ACTION,
    TRUSTED_TYPES,
    REQUIRE_TRUSTED_TYPES_FOR,
    STYLE_SRC_ATTR,
    STYLE_SRC_ELEM,
    SCRIPT_SRC_ATTR,
    SCRIPT_SRC_ELEM,
    WORKER_SRC,
    NAVIGATE_TO,
    PREFETCH_SRC,
    MANIFEST_SRC,
    REPORT_TO,
];

pub fn is_well_known(name: &str) -> bool {
    WELL_KNOWN.contains(&name)
}
