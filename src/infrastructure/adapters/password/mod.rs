//! Password Adapters - 凭据派生实现

mod scrypt_hasher;

pub use scrypt_hasher::{
    check_cost, ScryptHasherConfig, ScryptPasswordHasher, DERIVED_KEY_LEN, MAX_VERIFY_COST_BYTES,
    MAX_VERIFY_LOG_N, MAX_VERIFY_P, MAX_VERIFY_R, SALT_LEN,
};
