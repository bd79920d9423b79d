pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-')
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// `@@ROWCOUNT` and friends are system functions, not parameters.
pub(super) fn is_system_variable(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'@') && bytes.get(idx + 1) == Some(&b'@')
}

/// Whether the byte before `idx` continues an identifier (as in `user@host` or `a.@b`).
pub(super) fn follows_identifier(bytes: &[u8], idx: usize) -> bool {
    idx > 0 && {
        let prev = bytes[idx - 1];
        prev.is_ascii_alphanumeric() || matches!(prev, b'_' | b'@' | b'.')
    }
}
