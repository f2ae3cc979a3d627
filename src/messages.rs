//! User-facing response texts. Existing clients match on these strings, so
//! they stay in Spanish.

pub const OPERATION_OK: &str = "Operación realizada correctamente";
pub const PROFILE_UPDATED: &str = "Perfil actualizado exitosamente";

pub const INVALID_DATA: &str = "Datos inválidos";
pub const EMAIL_IN_USE: &str = "El correo electrónico ya está en uso";
pub const ACCESS_DENIED: &str = "Acceso denegado";
pub const WRONG_CREDENTIALS: &str = "Credenciales incorrectas";
pub const NOT_FOUND: &str = "No se pudo completar la operación";
pub const INTERNAL_ERROR: &str = "Error interno del servidor";

// Auth gate bodies: a missing header and a rejected token are reported differently.
pub const GATE_MISSING_CREDENTIALS: &str = "Unauthorized";
pub const GATE_INVALID_TOKEN: &str = "No autorizado";

pub const SERVER_RUNNING: &str = "Servidor funcionando correctamente";
