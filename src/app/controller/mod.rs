pub mod demo;
pub mod index;
pub mod login;
pub mod schema;
pub mod test;
pub mod upload;

pub use demo::{DemoController, DemoControllerApi};
pub use index::{IndexController, IndexControllerApi};
pub use login::{LoginController, LoginControllerApi, SessionController, SessionControllerApi};
pub use schema::{SchemaController, SchemaControllerApi};
pub use test::{TestController, TestControllerApi};
pub use upload::{UploadController, UploadControllerApi};
