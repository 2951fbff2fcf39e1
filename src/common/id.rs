//! Kademlia node Id or a lookup target
use rand::Rng;
use sha1_smol::Sha1;
use std::{
    fmt::{self, Debug, Display, Formatter},
    str::FromStr,
};

use crate::{Error, Result};

/// The size of node IDs in bytes.
pub const ID_SIZE: usize = 20;
/// The number of bits in an Id, which is also the number of k-buckets in a routing table.
pub const ID_BITS: usize = ID_SIZE * 8;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
/// Kademlia node Id or a lookup target.
///
/// Ordering is lexicographic over the bytes, which for XOR distances is the
/// same as comparing them as 160-bit unsigned integers.
pub struct Id([u8; ID_SIZE]);

impl Id {
    /// The all-zero Id, which is also the distance of every Id to itself.
    pub const ZERO: Id = Id([0; ID_SIZE]);

    pub fn random() -> Id {
        Self::random_with(&mut rand::thread_rng())
    }

    /// Random Id drawn from a caller supplied (possibly seeded) rng.
    pub fn random_with<R: Rng + ?Sized>(rng: &mut R) -> Id {
        let random_bytes: [u8; ID_SIZE] = rng.gen();

        Id(random_bytes)
    }

    /// Create a new Id from some bytes. Returns Err if `bytes` is not of length
    /// [ID_SIZE].
    pub fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Id> {
        let bytes = bytes.as_ref();
        if bytes.len() != ID_SIZE {
            return Err(Error::InvalidIdSize(bytes.len()));
        }

        let mut tmp: [u8; ID_SIZE] = [0; ID_SIZE];
        tmp.copy_from_slice(bytes);

        Ok(Id(tmp))
    }

    /// SHA-1 of arbitrary bytes, used to derive both peer Ids and keys.
    pub fn hash<T: AsRef<[u8]>>(bytes: T) -> Id {
        let mut hasher = Sha1::new();
        hasher.update(bytes.as_ref());

        Id(hasher.digest().bytes())
    }

    pub fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; ID_SIZE]
    }

    /// XOR distance between this Id and another.
    ///
    /// Commutative, and zero only for `self == other`.
    pub fn xor(&self, other: &Id) -> Id {
        let mut result = [0_u8; ID_SIZE];

        for (i, byte) in result.iter_mut().enumerate() {
            *byte = self.0[i] ^ other.0[i];
        }

        Id(result)
    }

    /// Alias of [Id::xor].
    pub fn distance(&self, other: &Id) -> Id {
        self.xor(other)
    }

    /// Treating `self` as a distance, returns the number of its leading zero bits,
    /// which is the index of the k-bucket a contact at this distance belongs to.
    ///
    /// Returns `None` for the zero distance.
    pub fn bucket_index(&self) -> Option<u8> {
        for (i, byte) in self.0.iter().enumerate() {
            if *byte != 0 {
                return Some((i as u32 * 8 + byte.leading_zeros()) as u8);
            }
        }

        None
    }

    /// The k-bucket index of `other` in a routing table owned by `self`.
    pub fn bucket_index_of(&self, other: &Id) -> Option<u8> {
        self.xor(other).bucket_index()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl From<[u8; ID_SIZE]> for Id {
    fn from(bytes: [u8; ID_SIZE]) -> Self {
        Id(bytes)
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Id> {
        if s.len() != ID_SIZE * 2 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidIdEncoding(s.to_string()));
        }

        let mut bytes = [0_u8; ID_SIZE];

        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = s
                .get(i * 2..i * 2 + 2)
                .ok_or_else(|| Error::InvalidIdEncoding(s.to_string()))?;

            *byte = u8::from_str_radix(pair, 16)
                .map_err(|_| Error::InvalidIdEncoding(s.to_string()))?;
        }

        Ok(Id(bytes))
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }

        Ok(())
    }
}

impl Debug for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn distance_is_symmetric_and_zero_to_self() {
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..100 {
            let a = Id::random_with(&mut rng);
            let b = Id::random_with(&mut rng);

            assert_eq!(a.distance(&b), b.distance(&a));
            assert_eq!(a.distance(&a), Id::ZERO);
            assert!(a.distance(&b) > a.distance(&a));
        }
    }

    #[test]
    fn bucket_index() {
        assert_eq!(Id::ZERO.bucket_index(), None);

        let mut bytes = [0_u8; ID_SIZE];
        bytes[0] = 0b1000_0000;
        assert_eq!(Id(bytes).bucket_index(), Some(0));

        bytes[0] = 0b0000_0001;
        assert_eq!(Id(bytes).bucket_index(), Some(7));

        let mut bytes = [0_u8; ID_SIZE];
        bytes[19] = 1;
        assert_eq!(Id(bytes).bucket_index(), Some(159));

        bytes[2] = 0b0010_0000;
        assert_eq!(Id(bytes).bucket_index(), Some(18));
    }

    #[test]
    fn bucket_index_matches_highest_set_bit() {
        let mut rng = StdRng::seed_from_u64(2);

        for _ in 0..100 {
            let distance = Id::random_with(&mut rng);
            if distance.is_zero() {
                continue;
            }
            let index = distance.bucket_index().unwrap() as usize;

            assert!(index < ID_BITS);

            // Every bit before the index is zero, the bit at the index is set.
            assert!(distance.0[..index / 8].iter().all(|b| *b == 0));
            assert_eq!(distance.0[index / 8].leading_zeros() as usize, index % 8);
        }
    }

    #[test]
    fn ordering_is_bytewise() {
        let a = Id::from_str("00000000000000000000000000000000000000ff").unwrap();
        let b = Id::from_str("0000000000000000000000000000000000000100").unwrap();

        assert!(a < b);
        assert_eq!(a.cmp(&a), std::cmp::Ordering::Equal);
    }

    #[test]
    fn hash_known_vector() {
        assert_eq!(
            Id::hash(b"abc").to_string(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn hex_roundtrip_and_errors() {
        let hex = "5a3ce9c14e7a08645677bbd1cfe7d8f956d53256";
        let id = Id::from_str(hex).unwrap();

        assert_eq!(id.to_string(), hex);
        assert_eq!(Id::from_bytes(id.as_bytes()).unwrap(), id);

        assert!(matches!(
            Id::from_str("5a3c"),
            Err(Error::InvalidIdEncoding(_))
        ));
        assert!(matches!(
            Id::from_str("zz3ce9c14e7a08645677bbd1cfe7d8f956d53256"),
            Err(Error::InvalidIdEncoding(_))
        ));
        assert_eq!(Id::from_bytes([0; 3]), Err(Error::InvalidIdSize(3)));
    }
}
