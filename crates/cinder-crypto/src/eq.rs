/// Equality whose running time does not depend on where two inputs differ.
///
/// Lengths are compared up front, the length of a stored key is not secret.
pub trait ConstantTimeEq {
    fn eq(&self, other: &Self) -> bool;
}

impl ConstantTimeEq for &[u8] {
    fn eq(&self, other: &Self) -> bool {
        subtle::ConstantTimeEq::ct_eq(*self, *other).into()
    }
}

impl ConstantTimeEq for Option<&[u8]> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (None, None) => true,
            (Some(a), Some(b)) => ConstantTimeEq::eq(a, b),
            _ => false,
        }
    }
}
