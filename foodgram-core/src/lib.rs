//! Storage-free domain logic for the Foodgram server: recipe and account
//! validation, shopping-list aggregation, short-link codes and inline image
//! decoding.

pub mod accounts;
pub mod error;
pub mod image;
pub mod shopping_list;
pub mod short_link;
pub mod validation;

pub use accounts::{check_new_password, validate_registration, Registration, RegistrationInput};
pub use error::{ImageError, ShortLinkError};
pub use image::{decode_data_uri, validate_image, DecodedImage, ALLOWED_FORMATS, MAX_FILE_SIZE};
pub use shopping_list::{aggregate, render, CartIngredient, ShoppingListEntry};
pub use short_link::{claim_with_retry, generate_code, is_valid_code, Claim};
pub use validation::{
    validate_new_recipe, validate_recipe_changes, Catalog, IngredientAmount, RecipeChanges,
    RecipeDraft, RecipeInput, ValidationErrors,
};
