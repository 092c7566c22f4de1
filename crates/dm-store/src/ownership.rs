//! Shared ownership predicate used by every `*ByUser` store method.
//!
//! Consolidates the `user_id = NULL/""` and owner-mismatch cases that would
//! otherwise be duplicated in every `WHERE id=? AND user_id=?` call site.

/// Checks `owner` against `caller`, using `mismatch` as the error for a
/// caller/owner mismatch. A `None`/empty owner is never satisfied by any
/// caller and always yields `NoAssociatedUser`, per the ownership invariant.
pub(crate) fn check(
    owner: &Option<String>,
    caller: &str,
    mismatch: crate::Error,
) -> crate::Result<()> {
    match owner.as_deref() {
        None | Some("") => Err(crate::Error::NoAssociatedUser),
        Some(v) if v == caller => Ok(()),
        Some(_) => Err(mismatch),
    }
}
