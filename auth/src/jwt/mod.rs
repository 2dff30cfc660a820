pub mod claims;
pub mod clock;
pub mod codec;
pub mod errors;
pub mod pair;

pub use claims::Claims;
pub use claims::TokenSubject;
pub use claims::TokenType;
pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use codec::TokenCodec;
pub use errors::JwtError;
pub use pair::TokenPair;
