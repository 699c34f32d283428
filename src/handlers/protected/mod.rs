// handlers/protected/mod.rs - Protected handlers
//
// Security Level: JWT authentication plus the `owner` role
// Middleware: jwt_auth_middleware → require_policy(Endpoint::policy())
//
// Handlers receive the verified caller as `Extension<AuthUser>`. Edit and
// delete additionally check that the caller owns the record they load.

pub mod restaurant;
