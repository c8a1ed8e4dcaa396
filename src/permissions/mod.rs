//! Role hierarchy and the per-event permission matrix.

pub mod matrix;
pub mod role;

pub use matrix::{
    can_role_perform, get_permissions_for_role, get_role_label, is_admin_role, is_role_higher_than,
    validate, MatrixError, Permission, PermissionMatrix, PERMISSION_TABLE,
};
pub use role::{Role, UnknownRole, ROLE_HIERARCHY};
