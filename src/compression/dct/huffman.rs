
//! Canonical huffman coding for one quantized 8×8 coefficient block.
//!
//! The codebook is fully determined by each symbol's code length and the
//! ascending symbol order within one length, so only the length groups are
//! stored in the file. Code lengths never exceed 8 bits.

use std::collections::{BTreeMap, BinaryHeap};
use std::cmp::Reverse;

use bit_field::BitField;
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::io::Data;
use super::{BLOCK_AREA, bits};
use super::bits::BitBuffer;


/// Maps a zig-zag sequence position to the flat index inside the 8×8 block.
/// Low-frequency coefficients come first, so trailing zeros can be trimmed.
pub const ZIGZAG: [usize; BLOCK_AREA] = [
     0,  8,  1,  2,  9, 16, 24, 17,
    10,  3,  4, 11, 18, 25, 32, 40,
    33, 26, 19, 12,  5,  6, 13, 20,
    27, 34, 41, 48, 56, 49, 42, 35,
    28, 21, 14,  7, 15, 22, 29, 36,
    43, 50, 57, 58, 51, 44, 37, 30,
    23, 31, 38, 45, 52, 59, 60, 53,
    46, 39, 47, 54, 61, 62, 55, 63,
];

/// No code is longer than this. Small per-block alphabets stay below
/// this bound in practice; pathological blocks fail with `HuffmanOverflow`.
pub const MAX_CODE_LENGTH: u8 = 8;

/// A serialized coded block never exceeds one `u8` chunk size.
pub const MAX_CODED_BLOCK_BYTES: usize = 255;

/// One codebook entry never describes more than this many symbols.
/// Larger length groups are split into consecutive entries.
const MAX_SYMBOLS_PER_ENTRY: usize = 32;

/// The symbols that share one code length, in ascending order.
type SymbolGroup = SmallVec<[i16; 16]>;

/// Maps each occurring code length to its ascending symbols.
type Codebook = BTreeMap<u8, SymbolGroup>;


/// The huffman coded form of one quantized 8×8 coefficient block:
/// the length-grouped codebook and the bit-packed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CodedBlock {
    payload_bits: u16,
    payload: BitBuffer,
    codebook: Codebook,
}

/// A huffman tree node inside the temporary arena.
/// The arena is discarded once the code lengths are known.
#[derive(Debug, Clone, Copy)]
struct Node {
    symbol: i16,
    children: Option<(usize, usize)>,
}


/// Encode one block of quantized coefficients.
///
/// The coefficients are visited in zig-zag order, the trailing run of zeros
/// is trimmed, and each remaining coefficient is emitted as one canonical
/// huffman code, most significant code bit first. An all-zero block is
/// encoded as a single zero symbol.
pub fn encode(coefficients: &[i16; BLOCK_AREA]) -> Result<CodedBlock> {
    let mut scanned = [0_i16; BLOCK_AREA];
    let mut trailing_zeros = 0_usize;

    for (position, &index) in ZIGZAG.iter().enumerate() {
        let coefficient = coefficients[index];
        debug_assert!((-1024 ..= 1023).contains(&coefficient), "coefficient exceeds 11 bits");

        scanned[position] = coefficient;
        if coefficient == 0 { trailing_zeros += 1; }
        else { trailing_zeros = 0; }
    }

    let mut symbol_count = BLOCK_AREA - trailing_zeros;

    let mut frequencies = BTreeMap::new();
    for &coefficient in &scanned {
        *frequencies.entry(coefficient).or_insert(0_u32) += 1;
    }

    // the trailing fill is not part of the message,
    // so it must not contribute to the alphabet
    if let Some(zero_frequency) = frequencies.get_mut(&0) {
        *zero_frequency -= trailing_zeros as u32;

        if *zero_frequency == 0 {
            if symbol_count == 0 {
                // an all-zero block is transmitted as a single zero
                *zero_frequency = 1;
                symbol_count = 1;
            }
            else {
                frequencies.remove(&0);
            }
        }
    }

    let codebook = build_codebook(&frequencies)?;
    let codes = assign_canonical_codes(&codebook);

    let mut payload = BitBuffer::new();
    let mut payload_bits = 0_usize;

    for coefficient in &scanned[.. symbol_count] {
        let &(length, code) = codes.get(coefficient).expect("symbol missing from codebook");

        for bit in 0 .. usize::from(length) {
            payload.set(payload_bits + bit, code.get_bit(usize::from(length) - 1 - bit));
        }

        payload_bits += usize::from(length);
    }

    debug_assert!(payload_bits <= bits::MAX_PAYLOAD_BITS);
    Ok(CodedBlock { payload_bits: payload_bits as u16, payload, codebook })
}

/// Derive the code length of every symbol by building a huffman tree
/// over the symbol frequencies. The tree lives in an arena of
/// integer-indexed nodes and is discarded on return.
fn build_codebook(frequencies: &BTreeMap<i16, u32>) -> Result<Codebook> {
    debug_assert!(!frequencies.is_empty(), "alphabet must not be empty");
    debug_assert!(frequencies.len() <= BLOCK_AREA);

    let mut arena: Vec<Node> = frequencies.keys()
        .map(|&symbol| Node { symbol, children: None })
        .collect();

    // min-heap over (frequency, arena index); on equal
    // frequencies, the node inserted first is merged first
    let mut heap: BinaryHeap<Reverse<(u32, usize)>> = frequencies.values()
        .enumerate()
        .map(|(index, &frequency)| Reverse((frequency, index)))
        .collect();

    while heap.len() > 1 {
        let Reverse((left_frequency, left)) = heap.pop().expect("heap is non-empty");
        let Reverse((right_frequency, right)) = heap.pop().expect("heap is non-empty");

        let merged = arena.len();
        arena.push(Node { symbol: 0, children: Some((left, right)) });
        heap.push(Reverse((left_frequency + right_frequency, merged)));
    }

    let Reverse((_, root)) = heap.pop().expect("heap is non-empty");

    let mut codebook = Codebook::new();
    collect_code_lengths(&arena, root, 0, &mut codebook)?;

    for symbols in codebook.values_mut() {
        symbols.sort_unstable();
    }

    Ok(codebook)
}

/// Group the leaf symbols of the tree by their depth.
/// A lone root leaf is forced to code length 1.
fn collect_code_lengths(arena: &[Node], node: usize, depth: u8, codebook: &mut Codebook) -> Result<()> {
    match arena[node].children {
        None => {
            codebook.entry(depth.max(1)).or_default().push(arena[node].symbol);
            Ok(())
        }

        Some((left, right)) => {
            if depth == MAX_CODE_LENGTH {
                return Err(Error::HuffmanOverflow);
            }

            collect_code_lengths(arena, left, depth + 1, codebook)?;
            collect_code_lengths(arena, right, depth + 1, codebook)
        }
    }
}

/// Assign the canonical code to every symbol: consecutive values within one
/// length, shifted left at each length boundary, starting at zero.
fn assign_canonical_codes(codebook: &Codebook) -> BTreeMap<i16, (u8, u8)> {
    let mut codes = BTreeMap::new();
    let mut code: u16 = 0;
    let mut previous_length = 0_u8;

    for (&length, symbols) in codebook {
        code <<= length - previous_length;

        for &symbol in symbols {
            debug_assert!(code < 1 << u16::from(length), "canonical code exceeds its length");
            codes.insert(symbol, (length, code as u8));
            code += 1;
        }

        previous_length = length;
    }

    codes
}


impl CodedBlock {

    /// Number of bytes `to_bytes` will produce.
    pub fn byte_size(&self) -> usize {
        3 + self.codebook_byte_size() + bytes_for_bits(self.payload_bits)
    }

    fn codebook_byte_size(&self) -> usize {
        self.codebook.values()
            .flat_map(|symbols| symbols.chunks(MAX_SYMBOLS_PER_ENTRY))
            .map(|group| 1 + bits::packed_byte_size(group.len()))
            .sum()
    }

    /// Serialize this block: payload bit count, codebook byte count,
    /// codebook entries, payload bytes.
    /// Returns `HuffmanOverflow` if the result would exceed 255 bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let total = self.byte_size();
        if total > MAX_CODED_BLOCK_BYTES {
            return Err(Error::HuffmanOverflow);
        }

        let codebook_bytes = self.codebook_byte_size();
        let payload_bytes = bytes_for_bits(self.payload_bits);

        let mut bytes = Vec::with_capacity(total);
        self.payload_bits.write(&mut bytes)?;
        (codebook_bytes as u8).write(&mut bytes)?;

        for (&length, symbols) in &self.codebook {
            for group in symbols.chunks(MAX_SYMBOLS_PER_ENTRY) {
                let mut descriptor = 0_u8;
                descriptor.set_bits(5 .. 8, length - 1);
                descriptor.set_bits(0 .. 5, (group.len() - 1) as u8);

                descriptor.write(&mut bytes)?;
                bits::pack_11bit(&mut bytes, group);
            }
        }

        u8::write_slice(&mut bytes, &self.payload.bytes()[.. payload_bytes])?;

        debug_assert_eq!(bytes.len(), total);
        Ok(bytes)
    }

    /// Parse one serialized coded block.
    /// Returns `Corrupt` if the declared sizes contradict the available bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut read = bytes;

        if bytes.len() < 3 {
            return Err(Error::corrupt("coded block shorter than its fixed fields"));
        }

        let payload_bits = u16::read(&mut read)?;
        if usize::from(payload_bits) > bits::MAX_PAYLOAD_BITS {
            return Err(Error::corrupt("payload bit count exceeds block capacity"));
        }

        let codebook_bytes = usize::from(u8::read(&mut read)?);
        let payload_bytes = bytes_for_bits(payload_bits);

        if 3 + codebook_bytes + payload_bytes > bytes.len() {
            return Err(Error::corrupt("coded block sizes exceed available bytes"));
        }

        let mut codebook = Codebook::new();
        let mut symbol_total = 0_usize;
        let mut consumed = 0_usize;

        while consumed < codebook_bytes {
            let descriptor = u8::read(&mut read)?;
            let length = descriptor.get_bits(5 .. 8) + 1;
            let count = usize::from(descriptor.get_bits(0 .. 5)) + 1;

            let packed_size = bits::packed_byte_size(count);
            consumed += 1 + packed_size;
            if consumed > codebook_bytes {
                return Err(Error::corrupt("codebook entry exceeds codebook size"));
            }

            symbol_total += count;
            if symbol_total > BLOCK_AREA {
                return Err(Error::corrupt("codebook describes too many symbols"));
            }

            let mut packed = vec![0_u8; packed_size];
            u8::read_slice(&mut read, &mut packed)?;
            codebook.entry(length).or_default()
                .extend(bits::unpack_11bit(&packed, count));
        }

        let mut payload = BitBuffer::new();
        u8::read_slice(&mut read, &mut payload.bytes_mut()[.. payload_bytes])?;

        Ok(CodedBlock { payload_bits, payload, codebook })
    }

    /// Decode the payload back into the 64 quantized coefficients.
    ///
    /// The output starts out all zero; decoded symbols are placed in zig-zag
    /// order until the payload bits are exhausted. Decoding fewer than 64
    /// symbols is the regular case whenever trailing zeros were trimmed.
    pub fn decode(&self) -> Result<[i16; BLOCK_AREA]> {
        let mut coefficients = [0_i16; BLOCK_AREA];
        let bit_count = usize::from(self.payload_bits);

        let mut position = 0_usize;
        let mut bit = 0_usize;

        while bit < bit_count {
            if position == BLOCK_AREA {
                return Err(Error::corrupt("payload encodes more symbols than block positions"));
            }

            coefficients[ZIGZAG[position]] = self.decode_symbol(&mut bit, bit_count)?;
            position += 1;
        }

        Ok(coefficients)
    }

    /// Consume one canonical code from the payload.
    /// For each length, `first` is the smallest code of that length; the
    /// accumulated code can never fall below it, so `code - first` indexes
    /// into the symbols of that length.
    fn decode_symbol(&self, bit: &mut usize, bit_count: usize) -> Result<i16> {
        let mut code: u16 = 0;
        let mut first: u16 = 0;

        for length in 1 ..= MAX_CODE_LENGTH {
            if *bit >= bit_count {
                return Err(Error::corrupt("payload ends in the middle of a symbol"));
            }

            code |= u16::from(self.payload.get(*bit));
            *bit += 1;

            let symbols = self.codebook.get(&length);
            let count = symbols.map_or(0, |symbols| symbols.len() as u16);

            if code < first + count {
                let symbols = symbols.expect("non-zero symbol count without symbols");
                return Ok(symbols[usize::from(code - first)]);
            }

            first = (first + count) << 1;
            code <<= 1;
        }

        Err(Error::corrupt("no symbol within the maximum code length"))
    }
}

/// Number of bytes needed to store the specified number of payload bits.
#[inline]
fn bytes_for_bits(bits: u16) -> usize {
    (usize::from(bits) + 7) / 8
}
