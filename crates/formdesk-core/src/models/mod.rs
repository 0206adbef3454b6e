pub mod geocode;
pub mod submission;
pub mod ticket;

pub use geocode::{AddressComponent, GeocodeResponse, GeocodeResult};
pub use submission::{
    is_reserved_field, DecodedForm, SubmittedFile, ValidatedSubmission, BOT_TOKEN_FIELDS,
    RESERVED_FIELDS,
};
pub use ticket::{
    AttachmentDescriptor, MessageSource, Party, RejectedFile, SubmissionReceipt, TicketCreated,
    TicketCustomer, TicketMessage, TicketPayload, TicketTag, TICKET_CHANNEL, TICKET_STATUS_OPEN,
    TICKET_VIA,
};
