use std::io::{Read, Write};
use flate2::{Compression, write::GzEncoder, read::GzDecoder};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// 魔数常量 - 用于标识快照格式
pub const MAGIC_BYTES: &[u8] = b"PBCAT"; // Problem Bank CATalog

/// 当前写出的快照版本
pub const SNAPSHOT_VERSION: [u8; 2] = [1, 0];

/// 解压缓冲区预分配相对压缩数据的最大倍数
const MAX_PREALLOC_RATIO: usize = 16;

/// 头部长度：魔数 + 版本号 + 原始数据大小
const HEADER_LEN: usize = MAGIC_BYTES.len() + 2 + 4;

/// 快照编解码错误
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("数据太短，无法解析: {0} 字节")]
    TooShort(usize),

    #[error("无效的文件格式：魔数不匹配")]
    BadMagic,

    #[error("不支持的版本: {0}.{1}")]
    UnsupportedVersion(u8, u8),

    #[error("解压后数据大小不匹配: 期望 {expected} 字节, 实际 {actual} 字节")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("数据过大，无法写入快照: {0} 字节")]
    TooLarge(usize),

    #[error("序列化失败: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("反序列化失败: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("压缩流读写失败: {0}")]
    Io(#[from] std::io::Error),
}

/// 快照头部信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub version: [u8; 2],
    pub original_size: usize,
}

/// 判断数据是否以快照魔数开头
pub fn is_snapshot(data: &[u8]) -> bool {
    data.starts_with(MAGIC_BYTES)
}

/// 将对象序列化为二进制格式
pub fn to_binary<T: Serialize>(obj: &T) -> Result<Vec<u8>, SnapshotError> {
    Ok(bincode::serde::encode_to_vec(obj, bincode::config::standard())?)
}

/// 从二进制格式反序列化对象
pub fn from_binary<T: DeserializeOwned>(data: &[u8]) -> Result<T, SnapshotError> {
    let (value, _) = bincode::serde::decode_from_slice(data, bincode::config::standard())?;
    Ok(value)
}

/// 将对象写成压缩快照
pub fn to_compressed<T: Serialize>(obj: &T, version: [u8; 2]) -> Result<Vec<u8>, SnapshotError> {
    let binary = to_binary(obj)?;
    let data_len = u32::try_from(binary.len()).map_err(|_| SnapshotError::TooLarge(binary.len()))?;

    let mut output = Vec::with_capacity(HEADER_LEN + binary.len() / 2);
    output.extend_from_slice(MAGIC_BYTES);
    output.extend_from_slice(&version);
    output.extend_from_slice(&data_len.to_le_bytes());

    let mut encoder = GzEncoder::new(output, Compression::best());
    encoder.write_all(&binary)?;
    Ok(encoder.finish()?)
}

/// 读取并校验快照头部
pub fn read_header(data: &[u8], max_version: u8) -> Result<SnapshotHeader, SnapshotError> {
    if data.len() < HEADER_LEN {
        return Err(SnapshotError::TooShort(data.len()));
    }

    if !is_snapshot(data) {
        return Err(SnapshotError::BadMagic);
    }

    let version_offset = MAGIC_BYTES.len();
    let version = [data[version_offset], data[version_offset + 1]];
    if version[0] > max_version {
        return Err(SnapshotError::UnsupportedVersion(version[0], version[1]));
    }

    let size_offset = version_offset + 2;
    let mut size_bytes = [0u8; 4];
    size_bytes.copy_from_slice(&data[size_offset..HEADER_LEN]);

    Ok(SnapshotHeader {
        version,
        original_size: u32::from_le_bytes(size_bytes) as usize,
    })
}

// 头部声明的大小不可信，预分配不超过压缩数据的固定倍数
fn initial_capacity(original_size: usize, compressed_len: usize) -> usize {
    original_size.min(compressed_len.saturating_mul(MAX_PREALLOC_RATIO))
}

/// 从压缩快照反序列化对象，允许指定支持的最大版本
pub fn from_compressed_with_max_version<T: DeserializeOwned>(
    data: &[u8],
    max_version: u8,
) -> Result<T, SnapshotError> {
    let header = read_header(data, max_version)?;

    let mut decoder = GzDecoder::new(&data[HEADER_LEN..]);
    let mut decompressed = Vec::with_capacity(initial_capacity(header.original_size, data.len()));
    decoder.read_to_end(&mut decompressed)?;

    if decompressed.len() != header.original_size {
        return Err(SnapshotError::SizeMismatch {
            expected: header.original_size,
            actual: decompressed.len(),
        });
    }

    from_binary(&decompressed)
}

/// 从压缩快照反序列化对象，支持当前版本
pub fn from_compressed<T: DeserializeOwned>(data: &[u8]) -> Result<T, SnapshotError> {
    from_compressed_with_max_version(data, SNAPSHOT_VERSION[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_records_version_and_size() {
        let payload = vec!["dp".to_string(), "graph".to_string()];
        let data = to_compressed(&payload, SNAPSHOT_VERSION).unwrap();
        let header = read_header(&data, 1).unwrap();
        assert_eq!(header.version, SNAPSHOT_VERSION);
        assert_eq!(header.original_size, to_binary(&payload).unwrap().len());

        let decoded: Vec<String> = from_compressed(&data).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn rejects_short_and_foreign_data() {
        assert!(matches!(read_header(b"PBC", 1), Err(SnapshotError::TooShort(3))));
        assert!(matches!(
            read_header(b"NECMP\x03\x00\x00\x00\x00\x00", 1),
            Err(SnapshotError::BadMagic)
        ));
    }

    #[test]
    fn rejects_newer_major_version() {
        let data = to_compressed(&1u32, [2, 0]).unwrap();
        assert!(matches!(
            from_compressed::<u32>(&data),
            Err(SnapshotError::UnsupportedVersion(2, 0))
        ));
    }

    #[test]
    fn detects_truncated_payload_size() {
        let mut data = to_compressed(&vec![1u8; 64], SNAPSHOT_VERSION).unwrap();
        // 篡改头部记录的原始大小
        let size_offset = MAGIC_BYTES.len() + 2;
        data[size_offset..size_offset + 4].copy_from_slice(&10u32.to_le_bytes());
        assert!(matches!(
            from_compressed::<Vec<u8>>(&data),
            Err(SnapshotError::SizeMismatch { expected: 10, .. })
        ));
    }

    #[test]
    fn declared_size_does_not_drive_preallocation() {
        assert_eq!(initial_capacity(u32::MAX as usize, 100), 1600);
        assert_eq!(initial_capacity(300, 100), 300);

        let mut data = to_compressed(&vec![7u8; 32], SNAPSHOT_VERSION).unwrap();
        let size_offset = MAGIC_BYTES.len() + 2;
        data[size_offset..size_offset + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            from_compressed::<Vec<u8>>(&data),
            Err(SnapshotError::SizeMismatch { .. })
        ));
    }
}
