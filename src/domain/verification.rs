/// Advisory verification heuristic. This is read-side display logic only:
/// `is_verified` itself changes exclusively through the explicit admin call,
/// and nothing may treat this suggestion as a security boundary.
pub const SUGGESTED_VERIFIED_THRESHOLD: i64 = 3;

pub fn suggested_verified(approved_document_count: i64) -> bool {
    approved_document_count >= SUGGESTED_VERIFIED_THRESHOLD
}
