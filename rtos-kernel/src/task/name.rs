use core::fmt;

/// A task or timer name stored inline.
///
/// Names longer than `CAPACITY - 1` bytes are cut at the last character
/// boundary that fits.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TaskName<const CAPACITY: usize> {
  buf: [u8; CAPACITY],
  len: usize,
}

impl<const CAPACITY: usize> TaskName<CAPACITY> {
  pub fn new(name: &str) -> Self {
    let mut buf = [0; CAPACITY];

    let mut len = 0;
    for c in name.chars() {
      if len + c.len_utf8() >= CAPACITY {
        break
      }
      c.encode_utf8(&mut buf[len..]);
      len += c.len_utf8();
    }

    Self { buf, len }
  }

  pub fn as_str(&self) -> &str {
    // Only whole characters are ever copied in.
    core::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
  }
}

impl<const CAPACITY: usize> fmt::Debug for TaskName<CAPACITY> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(self.as_str(), f)
  }
}

impl<const CAPACITY: usize> fmt::Display for TaskName<CAPACITY> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn long_names_are_cut_at_a_char_boundary() {
    assert_eq!(TaskName::<8>::new("blinky").as_str(), "blinky");
    assert_eq!(TaskName::<8>::new("blinkenlights").as_str(), "blinken");
    assert_eq!(TaskName::<5>::new("aöü").as_str(), "aö");
  }
}
