#![no_main]

use libfuzzer_sys::fuzz_target;
use refile_core::Pattern;

// Input: pattern, replacement and haystack on the first three lines.
fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let mut lines = input.lines().map(|s| s.chars().take(100).collect::<String>());

    let (Some(pattern), Some(replacement)) = (lines.next(), lines.next()) else {
        return;
    };
    let haystack = lines.next().unwrap_or_default();

    if let Ok(pattern) = Pattern::new(&pattern, &replacement) {
        let (replaced, count) = pattern.replace_all_counted(&haystack);
        assert_eq!(count == 0, !pattern.is_match(&haystack));
        assert_eq!(replaced, pattern.replace_all(&haystack));
    }
});
