//! # Route Access
//!
//! The role → view table. Every view the storefront can open is listed here
//! together with the roles allowed to open it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        authorize(view, role)                            │
//! │                                                                         │
//! │   public view ─────────────────────────────────────────► Granted        │
//! │                                                                         │
//! │   protected view ──► no session ───────────────────────► RedirectToLogin│
//! │                  └─► role not allowed ─────────────────► RedirectToLogin│
//! │                  └─► role allowed ─────────────────────► Granted        │
//! │                                                                         │
//! │   unknown path ────────────────────────────────────────► RedirectToLogin│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use crate::types::Role;

/// Every view reachable in the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    Register,
    CustomerHome,
    CustomerOrders,
    RetailerHome,
    RetailerOrders,
    RetailerProducts,
    RetailerBuyWholesale,
    WholesalerHome,
    WholesalerProducts,
    WholesalerOrders,
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    RedirectToLogin,
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted)
    }
}

impl View {
    pub const ALL: [View; 11] = [
        View::Login,
        View::Register,
        View::CustomerHome,
        View::CustomerOrders,
        View::RetailerHome,
        View::RetailerOrders,
        View::RetailerProducts,
        View::RetailerBuyWholesale,
        View::WholesalerHome,
        View::WholesalerProducts,
        View::WholesalerOrders,
    ];

    pub const fn path(&self) -> &'static str {
        match self {
            View::Login => "/auth/login",
            View::Register => "/auth/register",
            View::CustomerHome => "/customer",
            View::CustomerOrders => "/customer/orders",
            View::RetailerHome => "/retailer",
            View::RetailerOrders => "/retailer/orders",
            View::RetailerProducts => "/retailer/products",
            View::RetailerBuyWholesale => "/retailer/buy-wholesale",
            View::WholesalerHome => "/wholesaler",
            View::WholesalerProducts => "/wholesaler/products",
            View::WholesalerOrders => "/wholesaler/orders",
        }
    }

    /// Roles allowed to open the view. Empty means public.
    pub const fn allowed_roles(&self) -> &'static [Role] {
        match self {
            View::Login | View::Register => &[],
            View::CustomerHome | View::CustomerOrders => &[Role::Customer],
            View::RetailerHome
            | View::RetailerOrders
            | View::RetailerProducts
            | View::RetailerBuyWholesale => &[Role::Retailer],
            View::WholesalerHome | View::WholesalerProducts | View::WholesalerOrders => {
                &[Role::Wholesaler]
            }
        }
    }

    pub fn is_public(&self) -> bool {
        self.allowed_roles().is_empty()
    }

    /// Resolves a router path. Trailing slashes are ignored.
    pub fn from_path(path: &str) -> Option<View> {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" => trimmed,
            rest => rest,
        };
        View::ALL.into_iter().find(|view| view.path() == normalized)
    }

    /// Landing view after login.
    pub fn home_for(role: Role) -> View {
        match role {
            Role::Customer => View::CustomerHome,
            Role::Retailer => View::RetailerHome,
            Role::Wholesaler => View::WholesalerHome,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Decides whether a session with `role` may open `view`.
///
/// `role` is `None` when nobody is logged in.
pub fn authorize(view: View, role: Option<Role>) -> Access {
    if view.is_public() {
        return Access::Granted;
    }

    match role {
        Some(role) if view.allowed_roles().contains(&role) => Access::Granted,
        _ => Access::RedirectToLogin,
    }
}

/// [`authorize`] for a raw path. Unknown paths fall back to the login view.
pub fn authorize_path(path: &str, role: Option<Role>) -> Access {
    match View::from_path(path) {
        Some(view) => authorize(view, role),
        None => Access::RedirectToLogin,
    }
}
