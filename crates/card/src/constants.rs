//! Well-known application and file identifiers

/// Application identifiers
pub mod aid {
    /// ICAO 9303 LDS1 eMRTD application
    pub const ICAO_LDS1: [u8; 7] = [0xA0, 0x00, 0x00, 0x02, 0x47, 0x10, 0x01];
}

/// Elementary file identifiers inside the LDS1 application
pub mod file_id {
    /// EF.COM
    pub const EF_COM: [u8; 2] = [0x01, 0x1E];
    /// EF.SOD
    pub const EF_SOD: [u8; 2] = [0x01, 0x1D];
    /// EF.DG1
    pub const EF_DG1: [u8; 2] = [0x01, 0x01];
}
