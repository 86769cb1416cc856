//! Card session: sequencing of APDU exchanges and status word policy

use bytes::{Bytes, BytesMut};
use idcard_apdu_core::iso7816::{
    GetChallenge, GetResponse, MAX_READ_BINARY_OFFSET, ReadBinary, SelectDfByName, SelectFileById,
    Verify,
};
use idcard_apdu_core::response::status::common;
use idcard_apdu_core::{ApduCommand, CardExecutor, CardTransport, ExpectedLength, Response};
use idcard_asn1::icao::Com;
use idcard_asn1::{CardRecord, Decode, FileControlParameters, peek_header};
use tracing::{debug, instrument};

use crate::config::SessionConfig;
use crate::constants::{aid, file_id};
use crate::error::{Error, Result};

/// Bytes read first from a TLV file: tag, a long-form length and its four octets
const HEADER_READ_LEN: ExpectedLength = 6;

/// Verification state of a reference data object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinStatus {
    /// Already verified in this session
    Verified,
    /// Not verified, with the remaining attempts
    Retries(u8),
    /// No attempts left
    Blocked,
}

/// A session with one card over one transport
///
/// One command is outstanding at a time. Status words are interpreted here:
/// `61xx` and `6Cxx` are followed when the configuration allows it, any other
/// status besides `9000` becomes [`Error::Status`].
#[derive(Debug)]
pub struct CardSession<T: CardTransport> {
    executor: CardExecutor<T>,
    config: SessionConfig,
}

impl<T: CardTransport> CardSession<T> {
    /// Create a session over a transport
    pub const fn new(transport: T, config: SessionConfig) -> Self {
        Self::from_executor(CardExecutor::new(transport), config)
    }

    /// Create a session over an existing executor
    pub const fn from_executor(executor: CardExecutor<T>, config: SessionConfig) -> Self {
        Self { executor, config }
    }

    /// Get the configuration
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get the executor
    pub const fn executor(&self) -> &CardExecutor<T> {
        &self.executor
    }

    /// Get the executor mutably
    pub const fn executor_mut(&mut self) -> &mut CardExecutor<T> {
        &mut self.executor
    }

    /// Consume the session and return the transport
    pub fn into_transport(self) -> T {
        self.executor.into_transport()
    }

    /// SELECT an application or DF by name and return its FCI, if any
    pub fn select_df_by_name(&mut self, name: &[u8]) -> Result<Bytes> {
        let command = SelectDfByName::new(self.config.cla, Bytes::copy_from_slice(name));
        self.exchange("SELECT", &command)
    }

    /// SELECT an elementary file by identifier
    pub fn select_file_by_id(&mut self, fid: [u8; 2]) -> Result<()> {
        self.exchange("SELECT", &SelectFileById::new(self.config.cla, fid))?;
        Ok(())
    }

    /// SELECT an elementary file and decode the returned FCP template
    pub fn select_file_with_fcp(&mut self, fid: [u8; 2]) -> Result<FileControlParameters> {
        let command = SelectFileById::new(self.config.cla, fid).with_fcp();
        let fcp = self.exchange("SELECT", &command)?;
        Ok(FileControlParameters::decode(&fcp)?)
    }

    /// READ BINARY at `offset` with `length` as Le
    pub fn read_binary(&mut self, offset: usize, length: u16) -> Result<Bytes> {
        let offset = u16::try_from(offset)
            .ok()
            .filter(|&offset| offset <= MAX_READ_BINARY_OFFSET)
            .ok_or(Error::OffsetOutOfRange(offset))?;
        self.exchange("READ BINARY", &ReadBinary::new(self.config.cla, offset, length))
    }

    /// Read the whole selected file, sized by its outer TLV header
    #[instrument(level = "trace", skip(self))]
    pub fn read_tlv_file(&mut self) -> Result<Vec<u8>> {
        let head = self.read_header()?;
        let header = peek_header(&head)?;
        let size = header.total_len();
        let chunk = usize::from(self.config.max_read_length.max(1));
        let already_read = head.len().min(size);
        let max = readable_size(already_read, chunk);
        if size > max {
            return Err(Error::FileTooLarge { size, max });
        }
        debug!(tag = header.tag, size, "Reading TLV file");

        let mut file = Vec::with_capacity(size);
        file.extend_from_slice(&head[..already_read]);
        while file.len() < size {
            let length = (size - file.len()).min(chunk);
            let data = self.read_binary(file.len(), length as u16)?;
            if data.is_empty() {
                return Err(Error::InvalidResponse {
                    command: "READ BINARY",
                    reason: "empty chunk before end of file",
                });
            }
            let take = data.len().min(size - file.len());
            file.extend_from_slice(&data[..take]);
        }

        Ok(file)
    }

    /// First bytes of the selected file
    ///
    /// A file shorter than the header read answers with its content and `6282`.
    fn read_header(&mut self) -> Result<Bytes> {
        let command = ReadBinary::new(self.config.cla, 0, HEADER_READ_LEN);
        let response = self.transact("READ BINARY", &command)?;
        if response.status() == common::END_OF_FILE && !response.payload().is_empty() {
            debug!(len = response.payload().len(), "File shorter than the header read");
        } else {
            Self::check("READ BINARY", &response)?;
        }
        Ok(response.payload().clone())
    }

    /// VERIFY reference data such as a PIN
    pub fn verify(&mut self, reference: u8, pin: &[u8]) -> Result<()> {
        let command = Verify::new(self.config.cla, reference, Bytes::copy_from_slice(pin));
        let response = self.executor.execute(&command)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        match status.retries_remaining() {
            Some(retries) => Err(Error::WrongPin { retries }),
            None => Err(Error::Status {
                command: "VERIFY",
                status,
            }),
        }
    }

    /// Query the verification state without presenting reference data
    pub fn pin_status(&mut self, reference: u8) -> Result<PinStatus> {
        let response = self
            .executor
            .execute(&Verify::retry_counter(self.config.cla, reference))?;
        let status = response.status();
        if status.is_success() {
            return Ok(PinStatus::Verified);
        }
        match status.retries_remaining() {
            Some(0) => Ok(PinStatus::Blocked),
            Some(retries) => Ok(PinStatus::Retries(retries)),
            None if status == common::AUTHENTICATION_BLOCKED => Ok(PinStatus::Blocked),
            None => Err(Error::Status {
                command: "VERIFY",
                status,
            }),
        }
    }

    /// GET CHALLENGE: eight random bytes from the card
    pub fn get_challenge(&mut self) -> Result<[u8; 8]> {
        let challenge = self.exchange("GET CHALLENGE", &GetChallenge::new(self.config.cla))?;
        <[u8; 8]>::try_from(challenge.as_ref()).map_err(|_| Error::InvalidResponse {
            command: "GET CHALLENGE",
            reason: "challenge is not 8 bytes",
        })
    }

    /// Select the LDS1 application and decode EF.COM
    pub fn read_com(&mut self) -> Result<Com> {
        self.select_df_by_name(&aid::ICAO_LDS1)?;
        self.select_file_by_id(file_id::EF_COM)?;
        let file = self.read_tlv_file()?;
        Ok(Com::decode(&file)?)
    }

    /// Select a file in the current DF and decode it as whichever record it holds
    pub fn read_record(&mut self, fid: [u8; 2]) -> Result<CardRecord> {
        self.select_file_by_id(fid)?;
        let file = self.read_tlv_file()?;
        Ok(CardRecord::decode_any(&file)?)
    }

    /// Exchange one command and require `9000`
    fn exchange<C>(&mut self, name: &'static str, command: &C) -> Result<Bytes>
    where
        C: ApduCommand + ?Sized,
    {
        let response = self.transact(name, command)?;
        Self::check(name, &response)?;
        Ok(response.payload().clone())
    }

    /// Exchange one command and apply the status word policy
    #[instrument(level = "trace", skip(self, command))]
    fn transact<C>(&mut self, name: &'static str, command: &C) -> Result<Response>
    where
        C: ApduCommand + ?Sized,
    {
        let mut response = self.executor.execute(command)?;
        if !self.config.follow_status_hints {
            return Ok(response);
        }

        if let Some(le) = response.status().correct_length() {
            debug!(command = name, le, "Resending with corrected Le");
            let corrected = command.to_command().with_le(u16::from(le));
            response = self.executor.execute(&corrected)?;
        }
        self.collect_chained(name, response)
    }

    /// Follow `61xx` with GET RESPONSE until the card is done
    fn collect_chained(&mut self, name: &'static str, response: Response) -> Result<Response> {
        let mut status = response.status();
        if status.bytes_remaining().is_none() {
            return Ok(response);
        }

        let mut payload = BytesMut::from(response.payload().as_ref());
        let mut fetched = 0;
        while let Some(remaining) = status.bytes_remaining() {
            if fetched == self.config.max_get_responses {
                return Err(Error::TooManyGetResponses {
                    command: name,
                    limit: fetched,
                });
            }
            fetched += 1;

            debug!(command = name, remaining, "Fetching remaining response data");
            let get_response = GetResponse::new(self.config.cla, u16::from(status.sw2));
            let next = self.executor.execute(&get_response)?;
            payload.extend_from_slice(next.payload());
            status = next.status();
        }

        Ok(Response::new(payload.freeze(), status))
    }

    fn check(command: &'static str, response: &Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            debug!(command, %status, "Command failed");
            Err(Error::Status { command, status })
        }
    }
}

/// Largest file whose last READ BINARY chunk still starts at an addressable offset
fn readable_size(already_read: usize, chunk: usize) -> usize {
    let last_offset = usize::from(MAX_READ_BINARY_OFFSET);
    let chunks = last_offset.saturating_sub(already_read) / chunk + 1;
    already_read + chunks * chunk
}
