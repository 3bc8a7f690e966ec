//! Stable identifiers for violation codes.
//!
//! A `code` is a short snake_case discriminator that tooling can match on without parsing
//! the human-readable message.

// Schema stage
pub const CODE_SCHEMA_VIOLATION: &str = "schema_violation";
pub const CODE_NOT_AN_OBJECT: &str = "not_an_object";

// Domain / scoring documents
pub const CODE_DOMAINS_UNSUPPORTED: &str = "domains_unsupported_shape";
pub const CODE_DOMAINS_NOT_A_LIST: &str = "domains_not_a_list";
pub const CODE_DOMAIN_NOT_AN_OBJECT: &str = "domain_not_an_object";
pub const CODE_DOMAIN_MISSING_ID: &str = "domain_missing_id";
pub const CODE_DOMAIN_KEY_MISMATCH: &str = "domain_key_mismatch";
pub const CODE_DOMAIN_DUPLICATE_ID: &str = "duplicate_domain_id";
pub const CODE_DOMAIN_MALFORMED: &str = "domain_malformed";
pub const CODE_SCORING_MALFORMED: &str = "scoring_malformed";
pub const CODE_SCORING_BOUNDS_INVERTED: &str = "scoring_bounds_inverted";
pub const CODE_SCORING_BOUNDS_OVERFLOW: &str = "scoring_bounds_overflow";

// Cross-control rules
pub const CODE_DUPLICATE_CONTROL_ID: &str = "duplicate_control_id";
pub const CODE_UNKNOWN_DOMAIN: &str = "unknown_domain";
pub const CODE_SCORE_NOT_INTEGER: &str = "score_not_integer";
pub const CODE_SCORE_OUT_OF_SCALE: &str = "score_out_of_scale";
pub const CODE_MISSING_REQUIRED_LEVELS: &str = "missing_required_levels";
pub const CODE_DUPLICATE_LEVEL_SCORE: &str = "duplicate_level_score";
pub const CODE_WEIGHT_OUT_OF_BOUNDS: &str = "weight_out_of_bounds";
pub const CODE_CONTROL_MALFORMED: &str = "control_malformed";

// Findings
pub const CODE_FINDINGS_MALFORMED: &str = "findings_malformed";
pub const CODE_FINDING_NOT_AN_OBJECT: &str = "finding_not_an_object";
pub const CODE_FINDING_MISSING_CONTROL_ID: &str = "finding_missing_control_id";
pub const CODE_DUPLICATE_FINDING: &str = "duplicate_finding";
pub const CODE_FINDING_SCORE_NOT_INTEGER: &str = "finding_score_not_integer";
pub const CODE_FINDING_SCORE_OUT_OF_RANGE: &str = "finding_score_out_of_range";
pub const CODE_FINDING_FIELD_TYPE: &str = "finding_field_type";
pub const CODE_UNKNOWN_CONTROL: &str = "unknown_control";
