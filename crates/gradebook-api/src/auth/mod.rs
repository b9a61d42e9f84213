//! Authentication and authorization module
//!
//! This module provides JWT-based sessions with the following components:
//! - Token generation and validation
//! - Password hashing with Argon2
//! - Role gate with fixed per-operation allow-sets
//! - Guard chain middleware for request authentication
//! - Login service

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod roles;
pub mod service;

pub use jwt::{generate_access_token, validate_access_token, Claims, JwtConfig, JwtError};
pub use middleware::{
    authenticate, enforce, extract_bearer_token, AuthError, AuthenticatedUser, Guard, GuardChain,
    RequestContext, RoutePolicy,
};
pub use password::{hash_password, hash_password_with_config, verify_password, PasswordConfig};
pub use roles::{admit, Operation};
pub use service::{AuthService, LoginRequest, LoginResponse};
