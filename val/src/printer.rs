/*++

Licensed under the Apache-2.0 license.

File Name:

    printer.rs

Abstract:

    File contains the verbosity-filtered print channel.

--*/

use crate::platform::Platform;

/// Print levels in ascending severity. A message is emitted when its level
/// is at or above the suite's configured threshold; `Always` bypasses the
/// filter for banners and the final report.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
#[repr(u8)]
pub enum Verbosity {
    Info = 1,
    Debug = 2,
    Test = 3,
    Warn = 4,
    Error = 5,
    Always = 9,
}

impl Verbosity {
    pub fn at_least(self, threshold: Verbosity) -> bool {
        self as u8 >= threshold as u8
    }
}

/// Adapts a platform's byte sink to `core::fmt::Write` so call sites can use
/// format_args without an intermediate buffer.
pub struct SinkWriter<'a, P: Platform> {
    platform: &'a mut P,
}

impl<'a, P: Platform> SinkWriter<'a, P> {
    pub fn new(platform: &'a mut P) -> SinkWriter<'a, P> {
        SinkWriter { platform }
    }
}

impl<'a, P: Platform> core::fmt::Write for SinkWriter<'a, P> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for byte in s.bytes() {
            self.platform.write_byte(byte);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakePlatform;
    use core::fmt::Write;

    #[test]
    fn test_level_filter() {
        assert!(Verbosity::Error.at_least(Verbosity::Info));
        assert!(Verbosity::Test.at_least(Verbosity::Test));
        assert!(!Verbosity::Debug.at_least(Verbosity::Test));
        assert!(Verbosity::Always.at_least(Verbosity::Error));
    }

    #[test]
    fn test_writer_forwards_bytes() {
        let mut platform = FakePlatform::new();
        let mut writer = SinkWriter::new(&mut platform);
        write!(writer, "id {}", 42).unwrap();
        assert_eq!(platform.output_string(), "id 42");
    }
}
